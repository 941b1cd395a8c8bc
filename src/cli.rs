//! Command-line argument parsing and query dispatch for slotcheck

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::validator::BusinessHoursValidator;

/// One question for the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Check(String),
    Slots(String),
    Next(String),
    NextSlot(String),
}

/// Parse command line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub query: Option<Query>,
    pub validate: bool,
    pub help: bool,
}

pub fn parse_args() -> Args {
    parse_args_from(std::env::args())
}

/// Parse an explicit argument list; the first element is the program name.
/// The last query flag given wins; unknown flags are ignored.
pub fn parse_args_from<I>(args: I) -> Args
where
    I: IntoIterator<Item = String>,
{
    let mut result = Args::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        let make: Option<fn(String) -> Query> = match arg.as_str() {
            "--check" => Some(Query::Check),
            "--slots" => Some(Query::Slots),
            "--next" => Some(Query::Next),
            "--next-slot" => Some(Query::NextSlot),
            "--validate" => {
                result.validate = true;
                None
            }
            "--help" | "-h" => {
                result.help = true;
                None
            }
            _ => None,
        };

        if let Some(make) = make {
            match args.next() {
                Some(value) => result.query = Some(make(value)),
                None => result.help = true,
            }
        }
    }

    result
}

pub fn print_help() {
    println!("slotcheck - business hours and appointment slot validator\n");
    println!("USAGE:");
    println!("    slotcheck [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --check INSTANT       Check whether INSTANT can be booked");
    println!("    --slots INSTANT       List the slots offered on INSTANT's day");
    println!("    --next INSTANT        Show the next business day after INSTANT");
    println!("    --next-slot INSTANT   Show the first bookable slot at or after INSTANT");
    println!("    --validate            Validate configuration and exit");
    println!("    --help, -h            Show this help message\n");
    println!("INSTANT is RFC 3339 (2024-01-15T15:00:00+01:00), a date (2024-01-15) or \"now\".\n");
    println!("ENVIRONMENT:");
    println!("    BUSINESS_TIMEZONE       IANA timezone (default Europe/Paris)");
    println!("    BUSINESS_WORKING_DAYS   Weekdays 1-7, comma separated (default 1,2,3,4,5)");
    println!("    BUSINESS_START_TIME     HH:mm (default 14:00)");
    println!("    BUSINESS_END_TIME       HH:mm (default 16:30)");
    println!("    BUSINESS_SLOT_DURATION  Minutes between slots (default 30)");
}

/// "now" stands for the current time; anything else is passed through
fn instant_arg(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("now") {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    } else {
        raw.to_string()
    }
}

/// Answer a query as a JSON document
pub fn run_query(validator: &BusinessHoursValidator, query: &Query) -> Value {
    match query {
        Query::Check(raw) => {
            let instant = instant_arg(raw);
            match validator.check_booking(instant.as_str()) {
                Ok(()) => json!({ "instant": instant, "valid": true, "reason": null }),
                Err(rejection) => json!({
                    "instant": instant,
                    "valid": false,
                    "reason": rejection.to_string(),
                }),
            }
        }
        Query::Slots(raw) => {
            let instant = instant_arg(raw);
            let slots = validator.available_time_slots(instant.as_str());
            json!({ "instant": instant, "slots": slots })
        }
        Query::Next(raw) => {
            let from = instant_arg(raw);
            let next = validator
                .next_business_day(from.as_str())
                .map(|day| day.to_rfc3339_opts(SecondsFormat::Secs, true));
            json!({ "from": from, "nextBusinessDay": next })
        }
        Query::NextSlot(raw) => {
            let from = instant_arg(raw);
            let slot = validator.next_available_slot(from.as_str());
            json!({ "from": from, "slot": slot })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args_from(
            std::iter::once("slotcheck")
                .chain(list.iter().copied())
                .map(String::from),
        )
    }

    #[test]
    fn test_parse_args_default() {
        assert_eq!(args(&[]), Args::default());
    }

    #[test]
    fn test_parse_args_validate_and_help() {
        assert!(args(&["--validate"]).validate);
        assert!(args(&["--help"]).help);
        assert!(args(&["-h"]).help);
    }

    #[test]
    fn test_parse_args_queries() {
        assert_eq!(args(&["--check", "2024-01-15"]).query, Some(Query::Check("2024-01-15".into())));
        assert_eq!(args(&["--slots", "now"]).query, Some(Query::Slots("now".into())));
        assert_eq!(args(&["--next", "x"]).query, Some(Query::Next("x".into())));
        assert_eq!(args(&["--next-slot", "y"]).query, Some(Query::NextSlot("y".into())));
    }

    #[test]
    fn test_parse_args_last_query_wins() {
        let parsed = args(&["--check", "a", "--unknown", "--slots", "b"]);
        assert_eq!(parsed.query, Some(Query::Slots("b".into())));
    }

    #[test]
    fn test_parse_args_missing_value_shows_help() {
        let parsed = args(&["--check"]);
        assert!(parsed.help);
        assert!(parsed.query.is_none());
    }

    #[test]
    fn test_run_query_check() {
        let v = BusinessHoursValidator::default();

        let answer = run_query(&v, &Query::Check("2000-01-17T15:00:00+01:00".into()));
        assert_eq!(answer["valid"], false);
        assert_eq!(answer["reason"], "already in the past");

        let answer = run_query(&v, &Query::Check("2999-01-19T15:00:00+01:00".into()));
        assert_eq!(answer["valid"], false);
        assert_eq!(answer["reason"], "closed on Sat");

        let answer = run_query(&v, &Query::Check("garbage".into()));
        assert_eq!(answer["reason"], "not a valid date");
    }

    #[test]
    fn test_run_query_slots_and_next() {
        let v = BusinessHoursValidator::default();

        let answer = run_query(&v, &Query::Slots("2024-01-15".into()));
        assert_eq!(answer["slots"].as_array().map(Vec::len), Some(6));
        assert_eq!(answer["slots"][0]["time"], "14:00");

        let answer = run_query(&v, &Query::Next("2024-01-19T12:00:00Z".into()));
        assert_eq!(answer["nextBusinessDay"], "2024-01-22T12:00:00Z");

        let answer = run_query(&v, &Query::NextSlot("now".into()));
        assert!(answer["slot"].is_object());
        assert_ne!(answer["from"], "now");
    }
}
