use super::ids::GuildId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
    pub icon_url: Option<String>,
}

impl Guild {
    #[must_use]
    pub const fn new(id: GuildId, name: String, icon_url: Option<String>) -> Self {
        Self { id, name, icon_url }
    }
}

/// Where the guild list's order comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuildOrder {
    /// Whatever order the service returned them in
    Provider,

    /// The user's own ordering preference, as reported when the session
    /// became ready. Guilds missing from the preference keep provider order
    /// after the ones it lists.
    #[default]
    UserSettings,
}

impl GuildOrder {
    #[must_use]
    pub fn arrange(self, guilds: Vec<Guild>, positions: &[GuildId]) -> Vec<Guild> {
        match self {
            Self::Provider => guilds,
            Self::UserSettings => {
                let rank: HashMap<GuildId, usize> = positions
                    .iter()
                    .enumerate()
                    .map(|(index, id)| (*id, index))
                    .collect();

                let mut guilds = guilds;
                // stable, so unlisted guilds keep their relative order
                guilds.sort_by_key(|guild| rank.get(&guild.id).copied().unwrap_or(usize::MAX));
                guilds
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild(id: u64) -> Guild {
        Guild::new(GuildId(id), format!("guild {id}"), None)
    }

    fn ids(guilds: &[Guild]) -> Vec<u64> {
        guilds.iter().map(|g| g.id.0).collect()
    }

    #[test]
    fn provider_order_is_untouched() {
        let guilds = vec![guild(3), guild(1), guild(2)];
        let arranged = GuildOrder::Provider.arrange(guilds, &[GuildId(1), GuildId(2)]);
        assert_eq!(ids(&arranged), vec![3, 1, 2]);
    }

    #[test]
    fn user_settings_order_puts_unlisted_guilds_last() {
        let guilds = vec![guild(1), guild(2), guild(3), guild(4)];
        let positions = [GuildId(3), GuildId(9), GuildId(1)];

        let arranged = GuildOrder::UserSettings.arrange(guilds, &positions);
        assert_eq!(ids(&arranged), vec![3, 1, 2, 4]);
    }

    #[test]
    fn user_settings_order_with_no_preference() {
        let guilds = vec![guild(2), guild(1)];
        let arranged = GuildOrder::UserSettings.arrange(guilds, &[]);
        assert_eq!(ids(&arranged), vec![2, 1]);
    }
}
