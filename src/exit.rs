//! Process exit statuses.

use crate::error::AppError;
use crate::llm::ErrorClass;
use crate::session::SessionError;

pub const OK: i32 = 0;
/// Startup failure: config, logger, provider construction.
pub const STARTUP: i32 = 1;
/// API key file could not be created or read.
pub const WORKSPACE: i32 = 2;
/// No text could be extracted from any PDF.
pub const EMPTY_CORPUS: i32 = 3;
pub const NETWORK: i32 = 4;
pub const PARSE: i32 = 5;
pub const UNEXPECTED: i32 = 6;

pub fn for_startup(err: &AppError) -> i32 {
    match err {
        AppError::Workspace(_) => WORKSPACE,
        _ => STARTUP,
    }
}

pub fn for_session(err: &SessionError) -> i32 {
    match err {
        SessionError::Turn(e) => match e.class() {
            ErrorClass::Network => NETWORK,
            ErrorClass::Parse => PARSE,
            ErrorClass::Unexpected => UNEXPECTED,
        },
        SessionError::Io(_) => UNEXPECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::AnswerError;

    #[test]
    fn session_errors_map_per_class() {
        let network = SessionError::Turn(AnswerError::Transport("refused".into()));
        let parse = SessionError::Turn(AnswerError::Parse { message: "eof".into(), body: String::new() });
        let config = SessionError::Turn(AnswerError::Configuration("no key".into()));
        let io = SessionError::Io(std::io::Error::other("closed"));

        assert_eq!(for_session(&network), NETWORK);
        assert_eq!(for_session(&parse), PARSE);
        assert_eq!(for_session(&config), UNEXPECTED);
        assert_eq!(for_session(&io), UNEXPECTED);
    }

    #[test]
    fn workspace_errors_have_their_own_status() {
        assert_eq!(for_startup(&AppError::Workspace("denied".into())), WORKSPACE);
        assert_eq!(for_startup(&AppError::Config("bad".into())), STARTUP);
    }
}
