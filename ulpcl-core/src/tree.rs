//! The parse tree (`spec.md` §3): `Message`, `Group`, `RootGroup`,
//! `ParseTree`.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub messages: Vec<Message>,
    pub groups: Vec<Group>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
            groups: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootGroup {
    pub messages: Vec<Message>,
    pub groups: Vec<Group>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseTree {
    pub language: String,
    pub lcid: u32,
    pub content: RootGroup,
}

/// Shared shape of [`Group`] and [`RootGroup`] the dynamic parser recurses
/// over — mirrors the template parameter of the original recursive-descent
/// implementation.
pub trait GroupLike {
    fn messages(&self) -> &[Message];
    fn messages_mut(&mut self) -> &mut Vec<Message>;
    fn groups(&self) -> &[Group];
    fn groups_mut(&mut self) -> &mut Vec<Group>;
}

impl GroupLike for RootGroup {
    fn messages(&self) -> &[Message] {
        &self.messages
    }
    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
    fn groups(&self) -> &[Group] {
        &self.groups
    }
    fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }
}

impl GroupLike for Group {
    fn messages(&self) -> &[Message] {
        &self.messages
    }
    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
    fn groups(&self) -> &[Group] {
        &self.groups
    }
    fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }
}
