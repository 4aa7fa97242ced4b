//! Room inventory sources
//!
//! The registry is seeded once at startup. The config source builds a
//! floor grid; a property-management adapter would implement the same
//! trait against its API.

use crate::domain::error::Result;
use crate::domain::types::{Room, RoomId, RoomType};
use crate::infra::config::Config;
use async_trait::async_trait;

/// Source of the initial room inventory
#[async_trait]
pub trait RoomSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Room>>;
}

/// Builds the grid described by `[rooms]` in the config
///
/// Room numbers follow the usual floor convention: floor 2, door 3 is
/// "203". Types repeat per floor with suites at the corridor end.
pub struct ConfigRoomSource {
    hotel_id: String,
    floors: u32,
    rooms_per_floor: u32,
}

impl ConfigRoomSource {
    pub fn new(config: &Config) -> Self {
        Self {
            hotel_id: config.hotel_id().to_string(),
            floors: config.floors(),
            rooms_per_floor: config.rooms_per_floor(),
        }
    }

    fn build(&self) -> Vec<Room> {
        let mut rooms = Vec::with_capacity((self.floors * self.rooms_per_floor) as usize);
        for floor in 1..=self.floors {
            for door in 1..=self.rooms_per_floor {
                let number = RoomId::from(format!("{}", floor * 100 + door));
                let room_type = match door % 5 {
                    0 => RoomType::Suite,
                    3 | 4 => RoomType::Double,
                    _ => RoomType::Standard,
                };
                rooms.push(Room::new(&self.hotel_id, number, floor as i32, room_type));
            }
        }
        rooms
    }
}

#[async_trait]
impl RoomSource for ConfigRoomSource {
    async fn load(&self) -> Result<Vec<Room>> {
        Ok(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RoomStatus;

    #[tokio::test]
    async fn test_grid_size_and_numbering() {
        let config = Config::default().with_rooms(2, 4);
        let rooms = ConfigRoomSource::new(&config).load().await.unwrap();

        assert_eq!(rooms.len(), 8);
        let numbers: Vec<&str> = rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, ["101", "102", "103", "104", "201", "202", "203", "204"]);
        assert!(rooms.iter().all(|r| r.status == RoomStatus::Vacant));
    }

    #[tokio::test]
    async fn test_type_rotation_puts_suite_at_corridor_end() {
        let config = Config::default();
        let rooms = ConfigRoomSource::new(&config).load().await.unwrap();

        let suite = rooms.iter().find(|r| r.number.as_str() == "105").unwrap();
        assert_eq!(suite.room_type, RoomType::Suite);
        let standard = rooms.iter().find(|r| r.number.as_str() == "101").unwrap();
        assert_eq!(standard.room_type, RoomType::Standard);
        let double = rooms.iter().find(|r| r.number.as_str() == "103").unwrap();
        assert_eq!(double.room_type, RoomType::Double);
    }

    #[tokio::test]
    async fn test_rooms_carry_hotel_id() {
        let config = Config::default();
        let rooms = ConfigRoomSource::new(&config).load().await.unwrap();
        assert!(rooms.iter().all(|r| r.hotel_id == "frontdesk"));
    }
}
