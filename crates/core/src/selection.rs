use crate::model::EventId;

/// The currently selected event, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection(Option<EventId>);

impl Selection {
    pub fn get(&self) -> Option<EventId> {
        self.0
    }

    pub fn set(&mut self, id: Option<EventId>) {
        self.0 = id;
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_selected(&self, id: EventId) -> bool {
        self.0 == Some(id)
    }
}
