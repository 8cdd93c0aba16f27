//! Terminal front end: auth flow and tab navigation state machines, the
//! interactive interpreter and table rendering for list results.

pub mod flow;
pub mod outputformatter;
pub mod repl;
pub mod theme;
