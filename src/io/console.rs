//! Operator console - stdin lines in, desk commands out
//!
//! One command per line, whitespace separated. Free-text tails (transfer
//! reasons, task descriptions, guest names) swallow the rest of the line.
//! Anything unparsable gets a usage reply and is dropped.

use crate::domain::maintenance::{NewTask, TaskKind, TaskPriority};
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::domain::types::{RoomId, SessionId};
use crate::infra::audit::AuditModule;
use crate::services::desk::{DeskCommand, ReportKind};
use crate::services::reports::DateRange;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
commands:
  checkin open <staff>
  checkin room <session> <number>
  checkin plate <session> <text>
  checkin capture <session>
  checkin guest <session> <name>
  checkin commit <session>
  transfer request <source> <destination> <staff> <reason..>
  transfer complete <id> | transfer cancel <id> | transfer pending
  maint create <room> <kind> <priority> <reporter> <description..>
  maint start <id> | maint complete <id> [cost] | maint assign <id> <who>
  maint list | maint stats
  rooms | refresh
  report revenue|occupancy|audit <start> <end> [module]
  help | quit";

pub fn help() -> &'static str {
    HELP
}

/// Forward stdin to the desk until EOF or the desk goes away
pub async fn read_commands(command_tx: mpsc::Sender<DeskCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(Some(command)) => {
                    debug!(?command, "console_command");
                    if command_tx.send(command).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(reply) => println!("{reply}"),
            },
            Ok(None) => {
                // stdin closed; take the desk down with it
                let _ = command_tx.send(DeskCommand::Shutdown).await;
                break;
            }
            Err(err) => {
                warn!(error = %err, "stdin_read_failed");
                break;
            }
        }
    }
}

/// Parse one console line; `Ok(None)` for blank input
pub fn parse_line(line: &str) -> Result<Option<DeskCommand>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let command = match head {
        "checkin" => parse_checkin(&tokens)?,
        "transfer" => parse_transfer(&tokens)?,
        "maint" => parse_maint(&tokens)?,
        "rooms" => DeskCommand::Rooms,
        "refresh" => DeskCommand::Refresh,
        "report" => parse_report(&tokens)?,
        "help" => return Err(HELP.to_string()),
        "quit" | "exit" => DeskCommand::Shutdown,
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(command))
}

fn parse_checkin(tokens: &[&str]) -> Result<DeskCommand, String> {
    match tokens.get(1).copied() {
        Some("open") => match tokens.get(2) {
            Some(staff) => Ok(DeskCommand::OpenSession { staff: (*staff).to_string() }),
            None => Err("usage: checkin open <staff>".to_string()),
        },
        Some("room") => match (tokens.get(2), tokens.get(3)) {
            (Some(session), Some(number)) => Ok(DeskCommand::SelectRoom {
                session: session_arg(session)?,
                room: RoomId::from(*number),
            }),
            _ => Err("usage: checkin room <session> <number>".to_string()),
        },
        Some("plate") => match (tokens.get(2), tokens.get(3)) {
            (Some(session), Some(_)) => Ok(DeskCommand::EnterPlate {
                session: session_arg(session)?,
                plate: tokens[3..].join(" "),
            }),
            _ => Err("usage: checkin plate <session> <text>".to_string()),
        },
        Some("guest") => match (tokens.get(2), tokens.get(3)) {
            (Some(session), Some(_)) => Ok(DeskCommand::SetGuest {
                session: session_arg(session)?,
                name: tokens[3..].join(" "),
            }),
            _ => Err("usage: checkin guest <session> <name>".to_string()),
        },
        Some("capture") => match tokens.get(2) {
            Some(session) => Ok(DeskCommand::RequestCapture { session: session_arg(session)? }),
            None => Err("usage: checkin capture <session>".to_string()),
        },
        Some("commit") => match tokens.get(2) {
            Some(session) => Ok(DeskCommand::Commit { session: session_arg(session)? }),
            None => Err("usage: checkin commit <session>".to_string()),
        },
        _ => Err("checkin subcommands: open, room, plate, guest, capture, commit".to_string()),
    }
}

fn parse_transfer(tokens: &[&str]) -> Result<DeskCommand, String> {
    match tokens.get(1).copied() {
        Some("request") => {
            let (source, destination, staff) =
                match (tokens.get(2), tokens.get(3), tokens.get(4)) {
                    (Some(source), Some(destination), Some(staff)) => {
                        (*source, *destination, *staff)
                    }
                    _ => {
                        return Err(
                            "usage: transfer request <source> <destination> <staff> <reason..>"
                                .to_string(),
                        )
                    }
                };
            // blank reasons still reach the workflow, which refuses them
            let reason = tokens[5..].join(" ");
            let request = TransferRequest::new(
                RoomId::from(source),
                RoomId::from(destination),
                staff,
                &reason,
            );
            Ok(DeskCommand::RequestTransfer(request))
        }
        Some("complete") => match tokens.get(2) {
            Some(id) => Ok(DeskCommand::ResolveTransfer {
                id: (*id).to_string(),
                outcome: TransferOutcome::Completed,
            }),
            None => Err("usage: transfer complete <id>".to_string()),
        },
        Some("cancel") => match tokens.get(2) {
            Some(id) => Ok(DeskCommand::ResolveTransfer {
                id: (*id).to_string(),
                outcome: TransferOutcome::Cancelled,
            }),
            None => Err("usage: transfer cancel <id>".to_string()),
        },
        Some("pending") => Ok(DeskCommand::PendingTransfers),
        _ => Err("transfer subcommands: request, complete, cancel, pending".to_string()),
    }
}

fn parse_maint(tokens: &[&str]) -> Result<DeskCommand, String> {
    match tokens.get(1).copied() {
        Some("create") => {
            let (room, kind, priority, reporter) =
                match (tokens.get(2), tokens.get(3), tokens.get(4), tokens.get(5)) {
                    (Some(room), Some(kind), Some(priority), Some(reporter)) => {
                        (*room, *kind, *priority, *reporter)
                    }
                    _ => {
                        return Err(
                            "usage: maint create <room> <kind> <priority> <reporter> \
                             <description..>"
                                .to_string(),
                        )
                    }
                };
            let kind: TaskKind = kind.parse()?;
            let priority: TaskPriority = priority.parse()?;
            let description = tokens[6..].join(" ");
            let new_task =
                NewTask::new(RoomId::from(room), kind, priority, reporter, &description);
            Ok(DeskCommand::CreateTask(new_task))
        }
        Some("start") => match tokens.get(2) {
            Some(id) => Ok(DeskCommand::StartTask { id: (*id).to_string() }),
            None => Err("usage: maint start <id>".to_string()),
        },
        Some("complete") => match tokens.get(2) {
            Some(id) => {
                let actual_cost = match tokens.get(3) {
                    Some(cost) => Some(
                        cost.parse::<f64>().map_err(|_| format!("bad cost: {cost}"))?,
                    ),
                    None => None,
                };
                Ok(DeskCommand::CompleteTask { id: (*id).to_string(), actual_cost })
            }
            None => Err("usage: maint complete <id> [cost]".to_string()),
        },
        Some("assign") => match (tokens.get(2), tokens.get(3)) {
            (Some(id), Some(assignee)) => Ok(DeskCommand::AssignTask {
                id: (*id).to_string(),
                assignee: (*assignee).to_string(),
            }),
            _ => Err("usage: maint assign <id> <who>".to_string()),
        },
        Some("list") => Ok(DeskCommand::ListTasks),
        Some("stats") => Ok(DeskCommand::TaskStats),
        _ => Err("maint subcommands: create, start, complete, assign, list, stats".to_string()),
    }
}

fn parse_report(tokens: &[&str]) -> Result<DeskCommand, String> {
    let (kind, start, end) = match (tokens.get(1), tokens.get(2), tokens.get(3)) {
        (Some(kind), Some(start), Some(end)) => (*kind, *start, *end),
        _ => return Err("usage: report revenue|occupancy|audit <start> <end> [module]".to_string()),
    };
    let kind = match kind {
        "revenue" => ReportKind::Revenue,
        "occupancy" => ReportKind::Occupancy,
        "audit" => ReportKind::Audit,
        other => return Err(format!("unknown report: {other}")),
    };
    let range = DateRange::new(date_arg(start)?, date_arg(end)?)
        .map_err(|err| err.to_string())?;
    let module = match tokens.get(4) {
        Some(module) if kind == ReportKind::Audit => Some(module.parse::<AuditModule>()?),
        Some(_) => return Err("a module filter only applies to audit reports".to_string()),
        None => None,
    };
    Ok(DeskCommand::Report { kind, range, module })
}

fn session_arg(token: &str) -> Result<SessionId, String> {
    token.parse::<u64>().map(SessionId).map_err(|_| format!("bad session id: {token}"))
}

fn date_arg(token: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| format!("bad date: {token} (want YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_ignored() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_checkin_flow_commands() {
        let open = parse_line("checkin open ines").unwrap().unwrap();
        assert!(matches!(open, DeskCommand::OpenSession { ref staff } if staff == "ines"));

        let room = parse_line("checkin room 1 101").unwrap().unwrap();
        match room {
            DeskCommand::SelectRoom { session, room } => {
                assert_eq!(session, SessionId(1));
                assert_eq!(room, RoomId::from("101"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let commit = parse_line("checkin commit 1").unwrap().unwrap();
        assert!(matches!(commit, DeskCommand::Commit { session } if session == SessionId(1)));
    }

    #[test]
    fn test_multiword_tails_survive() {
        let guest = parse_line("checkin guest 2 Jo Harper").unwrap().unwrap();
        assert!(matches!(guest, DeskCommand::SetGuest { ref name, .. } if name == "Jo Harper"));

        let transfer = parse_line("transfer request 101 102 alex ac broken again").unwrap();
        match transfer.unwrap() {
            DeskCommand::RequestTransfer(request) => {
                assert_eq!(request.source, RoomId::from("101"));
                assert_eq!(request.destination, RoomId::from("102"));
                assert_eq!(request.staff, "alex");
                assert_eq!(request.reason, "ac broken again");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let task = parse_line("maint create 203 repair urgent dana tap drips all night").unwrap();
        match task.unwrap() {
            DeskCommand::CreateTask(new_task) => {
                assert_eq!(new_task.room, RoomId::from("203"));
                assert_eq!(new_task.kind, TaskKind::Repair);
                assert_eq!(new_task.priority, TaskPriority::Urgent);
                assert_eq!(new_task.description, "tap drips all night");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_report_parses_range_and_module() {
        let report = parse_line("report occupancy 2025-03-01 2025-03-07").unwrap().unwrap();
        match report {
            DeskCommand::Report { kind, range, module } => {
                assert_eq!(kind, ReportKind::Occupancy);
                assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
                assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
                assert!(module.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let audit = parse_line("report audit 2025-03-01 2025-03-07 transfer").unwrap().unwrap();
        assert!(matches!(
            audit,
            DeskCommand::Report { module: Some(AuditModule::Transfer), .. }
        ));
    }

    #[test]
    fn test_bad_input_yields_usage_text() {
        assert!(parse_line("report revenue 2025-13-01 2025-03-07").is_err());
        assert!(parse_line("checkin room one 101").is_err());
        assert!(parse_line("maint create 203 repair").is_err());
        assert!(parse_line("blargh").is_err());
        // inverted range is refused at parse time
        assert!(parse_line("report revenue 2025-03-07 2025-03-01").is_err());
    }

    #[test]
    fn test_quit_maps_to_shutdown() {
        assert!(matches!(parse_line("quit").unwrap().unwrap(), DeskCommand::Shutdown));
        assert!(matches!(parse_line("exit").unwrap().unwrap(), DeskCommand::Shutdown));
    }

    #[test]
    fn test_help_replies_with_command_list() {
        let reply = parse_line("help").unwrap_err();
        assert!(reply.contains("checkin open"));
        assert!(reply.contains("report revenue"));
        assert_eq!(reply, help());
    }
}
