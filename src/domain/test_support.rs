use std::sync::{Arc, Mutex};

use super::behavior::{Behavior, Context, Phase};
use super::collider::Collision;
use super::ids::EntityId;

// Hook invocations observed by a `Recorder`, tagged with the recorder's name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Start(&'static str),
    Update(&'static str, u64),
    Enabled(&'static str),
    Disabled(&'static str),
    Destroy(&'static str),
    Collision(&'static str, Phase, EntityId),
    Trigger(&'static str, Phase, EntityId),
}

#[derive(Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub(crate) fn push(&self, event: Event) {
        self.0.lock().expect("event log poisoned").push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().expect("event log poisoned").clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().expect("event log poisoned").clear();
    }
}

// Behavior that records every hook it receives.
pub(crate) struct Recorder {
    name: &'static str,
    log: EventLog,
}

impl Recorder {
    pub(crate) fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }
}

impl Behavior for Recorder {
    fn start(&mut self, _ctx: &mut Context<'_>) {
        self.log.push(Event::Start(self.name));
    }

    fn update(&mut self, _ctx: &mut Context<'_>, tick: u64) {
        self.log.push(Event::Update(self.name, tick));
    }

    fn on_enabled(&mut self, _ctx: &mut Context<'_>) {
        self.log.push(Event::Enabled(self.name));
    }

    fn on_disabled(&mut self, _ctx: &mut Context<'_>) {
        self.log.push(Event::Disabled(self.name));
    }

    fn on_destroy(&mut self, _ctx: &mut Context<'_>) {
        self.log.push(Event::Destroy(self.name));
    }

    fn on_collision_enter(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log
            .push(Event::Collision(self.name, Phase::Enter, other.entity));
    }

    fn on_collision_stay(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log
            .push(Event::Collision(self.name, Phase::Stay, other.entity));
    }

    fn on_collision_exit(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log
            .push(Event::Collision(self.name, Phase::Exit, other.entity));
    }

    fn on_trigger_enter(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Event::Trigger(self.name, Phase::Enter, other.entity));
    }

    fn on_trigger_stay(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Event::Trigger(self.name, Phase::Stay, other.entity));
    }

    fn on_trigger_exit(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Event::Trigger(self.name, Phase::Exit, other.entity));
    }
}
