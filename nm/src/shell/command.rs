//! Slash command parsing

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::app::{Intent, UiMode};
use crate::domain::{
    DietaryType, FederatedSession, MealSlot, Mood, Preferences, RegionalCuisine, RegistrationForm, TimeOfDay, UserKey,
};

/// What a line of input asks the shell to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Dispatch(Intent),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    BadValue(String),
}

fn value<T>(raw: &str, parse: impl FnOnce(&str) -> Result<T, crate::domain::ParseLabelError>) -> Result<T, ParseError> {
    parse(raw).map_err(|e| ParseError::BadValue(e.to_string()))
}

/// Parse `YYYY-MM-DD` or `+N` days from `today`
fn parse_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ParseError> {
    if let Some(offset) = raw.strip_prefix('+') {
        let days: u64 = offset
            .parse()
            .map_err(|_| ParseError::BadValue(format!("'{}' is not a day offset", raw)))?;
        return today
            .checked_add_days(Days::new(days))
            .ok_or_else(|| ParseError::BadValue(format!("'{}' is out of range", raw)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ParseError::BadValue(format!("'{}' is not a date", raw)))
}

/// Turn one input line into a command; `today` anchors relative dates
pub fn parse_command(input: &str, today: NaiveDate) -> Result<ShellCommand, ParseError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let cmd = parts.first().copied().unwrap_or("");
    let args = &parts[parts.len().min(1)..];
    let rest = args.join(" ");

    let intent = match cmd {
        "/help" | "/h" => return Ok(ShellCommand::Help),
        "/quit" | "/q" | "/exit" => return Ok(ShellCommand::Quit),
        "/status" | "/s" => return Ok(ShellCommand::Status),
        "/register" => {
            let [email, diet, region, name @ ..] = args else {
                return Err(ParseError::Usage("/register <email> <diet> <region> [name...]"));
            };
            let preferences = Preferences {
                dietary: value(diet, str::parse::<DietaryType>)?,
                regional: value(region, str::parse::<RegionalCuisine>)?,
            };
            Intent::Register(RegistrationForm::new(name.join(" "), *email, preferences))
        }
        "/login" => {
            let key = args
                .first()
                .and_then(|raw| UserKey::parse(raw))
                .ok_or(ParseError::Usage("/login <id>"))?;
            Intent::SignInWithId(key)
        }
        "/guest" => Intent::SignInGuest,
        "/federated" => Intent::SignInFederated,
        "/federated-complete" => {
            let [token, subject, email @ ..] = args else {
                return Err(ParseError::Usage("/federated-complete <token> <subject> [email]"));
            };
            Intent::FederatedSessionEstablished(FederatedSession {
                access_token: token.to_string(),
                subject: subject.to_string(),
                email: email.first().map(|e| e.to_string()),
            })
        }
        "/federated-clear" => Intent::FederatedSessionCleared,
        "/signout" | "/logout" => Intent::SignOut,
        "/mood" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("/mood <mood>"));
            }
            Intent::SetMood(value(&rest, str::parse::<Mood>)?)
        }
        "/time" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("/time <breakfast|lunch|dinner|snacking>"));
            }
            Intent::SetTimeOfDay(value(&rest, str::parse::<TimeOfDay>)?)
        }
        "/suggest" => Intent::RequestSuggestion,
        "/plan" => Intent::SwitchMode(UiMode::Plan),
        "/suggest-mode" => Intent::SwitchMode(UiMode::Suggest),
        "/refresh" => Intent::RefreshPlan,
        "/schedule" => Intent::OpenSchedule { today },
        "/date" => {
            let raw = args.first().ok_or(ParseError::Usage("/date <YYYY-MM-DD|+N>"))?;
            Intent::SetScheduleDate(parse_date(raw, today)?)
        }
        "/slot" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("/slot <breakfast|lunch|dinner>"));
            }
            Intent::SetScheduleSlot(value(&rest, str::parse::<MealSlot>)?)
        }
        "/commit" => Intent::CommitSchedule,
        "/cancel" => Intent::CancelSchedule,
        "/dismiss" => {
            let id = args
                .first()
                .and_then(|raw| raw.parse().ok())
                .ok_or(ParseError::Usage("/dismiss <notice-id>"))?;
            Intent::DismissNotice(id)
        }
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(ShellCommand::Dispatch(intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn intent(input: &str) -> Intent {
        match parse_command(input, today()).unwrap() {
            ShellCommand::Dispatch(intent) => intent,
            other => panic!("expected intent, got {other:?}"),
        }
    }

    #[test]
    fn test_register_parses_preferences_and_name() {
        let Intent::Register(form) = intent("/register a@example.com non-vegetarian south-indian Asha Rao") else {
            panic!("expected register");
        };
        assert_eq!(form.email, "a@example.com");
        assert_eq!(form.full_name, "Asha Rao");
        assert_eq!(form.preferences.dietary, DietaryType::NonVegetarian);
        assert_eq!(form.preferences.regional, RegionalCuisine::SouthIndian);

        let err = parse_command("/register a@example.com", today()).unwrap_err();
        assert!(matches!(err, ParseError::Usage(_)));
    }

    #[test]
    fn test_mood_accepts_multi_word_labels() {
        assert_eq!(intent("/mood comfort craving"), Intent::SetMood(Mood::ComfortCraving));
        assert_eq!(
            intent("/mood Healthy & Guilt Free"),
            Intent::SetMood(Mood::HealthyGuiltFree)
        );
        let err = parse_command("/mood grumpy", today()).unwrap_err();
        assert!(err.to_string().contains("Comfort Craving"));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            intent("/date +2"),
            Intent::SetScheduleDate(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
        );
        assert_eq!(
            intent("/date 2026-11-01"),
            Intent::SetScheduleDate(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap())
        );
        assert!(parse_command("/date tomorrow", today()).is_err());
        assert!(parse_command("/date +x", today()).is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(intent("/guest"), Intent::SignInGuest);
        assert_eq!(intent("/login 42"), Intent::SignInWithId(UserKey::Numeric(42)));
        assert_eq!(intent("/slot lunch"), Intent::SetScheduleSlot(MealSlot::Lunch));
        assert_eq!(intent("/schedule"), Intent::OpenSchedule { today: today() });
        assert_eq!(intent("/dismiss 3"), Intent::DismissNotice(3));
        assert_eq!(parse_command("/quit", today()).unwrap(), ShellCommand::Quit);
        assert!(matches!(
            parse_command("/frobnicate", today()),
            Err(ParseError::Unknown(_))
        ));
    }

    #[test]
    fn test_federated_complete() {
        let Intent::FederatedSessionEstablished(session) = intent("/federated-complete tok sub-1 a@example.com") else {
            panic!("expected federated session");
        };
        assert_eq!(session.subject, "sub-1");
        assert_eq!(session.email.as_deref(), Some("a@example.com"));
    }
}
