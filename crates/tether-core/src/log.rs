use derive_more::Display;
use serde::{Deserialize, Serialize};

#[doc(hidden)]
pub use ::tracing as __tracing;

///
/// Level
///

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Display, Serialize, Deserialize)]
pub enum Level {
    Debug, // least severe
    Info,
    Ok,
    Warn,
    Error, // most severe
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Auth,
    Call,
    Ids,
    Inputs,
    Request,
    Runtime,
}

#[macro_export]
macro_rules! log {
    // =========================================
    // (1) With topic (normal + trailing comma)
    // =========================================
    ($topic:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner Some(&$topic.to_string()), $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // (2) No topic (normal + trailing comma)
    // =========================================
    ($level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner None::<&str>, $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // INTERNAL
    // =========================================
    (@inner $topic:expr, $level:expr, $fmt:expr $(, $arg:expr)*) => {{
        let level = $level;
        let topic_opt: Option<&str> = $topic;
        let topic = topic_opt.unwrap_or("-");
        let message = format!($fmt $(, $arg)*);

        match level {
            $crate::log::Level::Debug => {
                $crate::log::__tracing::debug!(topic, "{message}");
            }
            $crate::log::Level::Info => {
                $crate::log::__tracing::info!(topic, "{message}");
            }
            $crate::log::Level::Ok => {
                $crate::log::__tracing::info!(topic, ok = true, "{message}");
            }
            $crate::log::Level::Warn => {
                $crate::log::__tracing::warn!(topic, "{message}");
            }
            $crate::log::Level::Error => {
                $crate::log::__tracing::error!(topic, "{message}");
            }
        }
    }};
}

///
/// TESTS
///
