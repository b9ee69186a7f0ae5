use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::GameRow;
use infra::repos::{CreateGameData, UpdateGameData};

#[derive(SimpleObject, Clone, Debug)]
pub struct Game {
    pub id: ID,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreateGameInput {
    pub name: String,
    #[graphql(default)]
    pub description: String,
    pub image_url: Option<String>,
}

impl CreateGameInput {
    pub fn into_data(self) -> Option<CreateGameData> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(CreateGameData {
            name,
            description: self.description.trim().to_string(),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
        })
    }
}

#[derive(InputObject, Debug)]
pub struct UpdateGameInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateGameInput {
    /// `None` when a name is given but blank.
    pub fn into_data(self) -> Option<UpdateGameData> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => return None,
            other => other.map(|n| n.trim().to_string()),
        };
        Some(UpdateGameData {
            name,
            description: self.description,
            image_url: self.image_url,
        })
    }
}
