#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, strum_macros::EnumIter)]
pub enum Command {
    NavUp,
    NavDown,
    NavTop,
    NavBottom,

    FocusLeft,
    FocusRight,

    Confirm,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    RegionNav,
    Selection,
    AppNav,
    Hidden,
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegionNav => write!(f, "List Navigation"),
            Self::Selection => write!(f, "Selection"),
            Self::AppNav => write!(f, "Navigation"),
            Self::Hidden => write!(f, ""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub commands: Vec<Command>,
    pub name: &'static str,
    pub category: CommandCategory,
}

impl CommandGroup {
    pub const fn new(commands: Vec<Command>, name: &'static str) -> Self {
        Self {
            commands,
            name,
            category: CommandCategory::Hidden,
        }
    }

    pub const fn in_cat(mut self, category: CommandCategory) -> Self {
        self.category = category;
        self
    }
}
