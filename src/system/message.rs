use crate::view::Region;

#[derive(Debug, Clone, strum_macros::Display)]
pub enum AppAction {
    FocusRegion(Region),
    Quit,
}

#[derive(Debug, Clone, strum_macros::Display)]
enum Action {
    AppAction(AppAction),
}

#[derive(Debug, Clone)]
pub struct Message(Action);

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Message {
    pub const fn to_app(action: AppAction) -> Self {
        Self(Action::AppAction(action))
    }

    pub fn read_as_app(&self) -> Option<&AppAction> {
        let Action::AppAction(action) = &self.0;
        Some(action)
    }
}
