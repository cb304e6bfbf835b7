//! Bulk-import record model.
//!
//! Every line of the manifest is one [`OutputRecord`], serialized as a JSON
//! object whose `type` field names the variant and whose payload sits under a
//! key of the same name:
//!
//! ```jsonl
//! {"type":"version","version":1}
//! {"type":"team","team":{"name":"example","display_name":"example","type":"O"}}
//! {"type":"post","post":{"id":4,"team":"example","channel":"town-square","user":"alice","message":"Hi","create_at":1609495200000}}
//! ```
//!
//! Post ids are the post's 0-based line number in the manifest.

use serde::{Deserialize, Serialize};

/// Version declared by the first manifest line.
pub const IMPORT_FORMAT_VERSION: u32 = 1;

/// Channel and team type for open (public) channels.
pub const OPEN_TYPE: &str = "O";

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputRecord {
    Version { version: u32 },
    Team { team: TeamRecord },
    Channel { channel: ChannelRecord },
    User { user: UserRecord },
    Post { post: PostRecord },
    DirectChannel { direct_channel: DirectChannelRecord },
    DirectPost { direct_post: PostRecord },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub team: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Membership of an existing user. Accounts are not provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<TeamMembership>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub name: String,
    pub channels: Vec<ChannelMembership>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMembership {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectChannelRecord {
    pub members: Vec<String>,
}

/// Body shared by `post` and `direct_post` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Manifest line number of this record.
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_members: Option<Vec<String>>,
    pub user: String,
    pub message: String,
    /// Epoch milliseconds.
    pub create_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
    /// Id of the direct parent post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Id of the top post of the reply chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<i64>,
}

/// Attached file, relative to the archive's `data/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub path: String,
}

impl OutputRecord {
    pub fn version() -> Self {
        OutputRecord::Version {
            version: IMPORT_FORMAT_VERSION,
        }
    }

    /// The post body of `post` and `direct_post` records.
    pub fn post_body(&self) -> Option<&PostRecord> {
        match self {
            OutputRecord::Post { post } => Some(post),
            OutputRecord::DirectPost { direct_post } => Some(direct_post),
            _ => None,
        }
    }

    /// The wire name of the variant, e.g. `direct_post`.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutputRecord::Version { .. } => "version",
            OutputRecord::Team { .. } => "team",
            OutputRecord::Channel { .. } => "channel",
            OutputRecord::User { .. } => "user",
            OutputRecord::Post { .. } => "post",
            OutputRecord::DirectChannel { .. } => "direct_channel",
            OutputRecord::DirectPost { .. } => "direct_post",
        }
    }

    /// Serializes the record as one manifest line, without the newline.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
