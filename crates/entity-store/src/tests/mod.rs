use crate::{Entities, Entity, EntityStore, RelatedEntity};

#[derive(Debug, Clone, PartialEq)]
struct Author {
    id: String,
    name: String,
}

impl Entity for Author {
    const ENTITY: Entities = Entities::Accounts;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: String,
    text: String,
    author: Option<Author>,
}

impl Entity for Note {
    const ENTITY: Entities = Entities::Statuses;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        self.author.iter().map(RelatedEntity::new).collect()
    }
}

fn note(id: &str, text: &str) -> Note {
    Note {
        id: id.into(),
        text: text.into(),
        author: None,
    }
}

fn notes(ids: &[&str]) -> Vec<Note> {
    ids.iter().map(|id| note(id, "")).collect()
}

fn test_store() -> EntityStore {
    EntityStore::new()
}

mod lists;
