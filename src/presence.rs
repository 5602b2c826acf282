use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::http_client::{fetch_text, http_client};

/// Members listed before the invite line takes over.
pub const MAX_MEMBERS_SHOWN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceMember {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceWidget {
    pub online_count: u64,
    pub members: Vec<PresenceMember>,
    pub invite_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WidgetResponse {
    #[serde(default)]
    presence_count: Option<u64>,
    #[serde(default)]
    members: Vec<WidgetMember>,
    #[serde(default)]
    instant_invite: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WidgetMember {
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

pub fn widget_url(server_id: &str) -> String {
    format!("https://discord.com/api/guilds/{server_id}/widget.json")
}

pub fn fetch_presence(server_id: &str) -> Result<PresenceWidget> {
    let client = http_client()?;
    let body = fetch_text(client, &widget_url(server_id)).context("presence request failed")?;
    let widget = parse_presence_json(&body)?;
    info!(online = widget.online_count, "presence widget loaded");
    Ok(widget)
}

pub fn parse_presence_json(raw: &str) -> Result<PresenceWidget> {
    let resp: WidgetResponse =
        serde_json::from_str(raw.trim()).context("invalid presence widget json")?;
    let members = resp
        .members
        .into_iter()
        .filter(|m| !m.username.trim().is_empty())
        .take(MAX_MEMBERS_SHOWN)
        .map(|m| PresenceMember {
            display_name: m.username.trim().to_string(),
            avatar_url: m.avatar_url.filter(|u| !u.is_empty()),
        })
        .collect();
    Ok(PresenceWidget {
        online_count: resp.presence_count.unwrap_or(0),
        members,
        invite_url: resp.instant_invite.filter(|u| !u.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_five_members() {
        let members: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"username":"user{i}","avatar_url":"https://cdn/{i}.png"}}"#))
            .collect();
        let raw = format!(
            r#"{{"presence_count":42,"members":[{}],"instant_invite":"https://discord.gg/abc"}}"#,
            members.join(",")
        );
        let widget = parse_presence_json(&raw).unwrap();
        assert_eq!(widget.online_count, 42);
        assert_eq!(widget.members.len(), MAX_MEMBERS_SHOWN);
        assert_eq!(widget.members[0].display_name, "user0");
        assert_eq!(widget.invite_url.as_deref(), Some("https://discord.gg/abc"));
    }

    #[test]
    fn missing_fields_default() {
        let widget = parse_presence_json(r#"{"instant_invite":null}"#).unwrap();
        assert_eq!(widget.online_count, 0);
        assert!(widget.members.is_empty());
        assert!(widget.invite_url.is_none());
    }
}
