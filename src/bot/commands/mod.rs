use std::{collections::HashMap, sync::Arc};

use crate::bot::commands::commands::CommandT;

pub mod commands;
pub mod general;
pub mod owner;

/// A command together with the extra tokens that invoke it.
#[derive(Clone)]
pub struct CommandRegistration {
    pub aliases: Vec<String>,
    pub command: Arc<dyn CommandT>,
}

/// A plugin: a named, ordered set of commands.
pub struct CommandGroup {
    pub name: String,
    pub commands: Vec<CommandRegistration>,
}

/// What a token in the dispatch table points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRef {
    pub plugin_name: String,
    pub command_name: String,
}

pub type CommandMap = HashMap<String, Arc<dyn CommandT>>;

pub struct CommandRegistry {
    pub plugins: HashMap<String, CommandMap>,
    pub tokens: HashMap<String, CommandRef>,
    /// Plugin names in registration order, for listings.
    pub order: Vec<String>,
}
