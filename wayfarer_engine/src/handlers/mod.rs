//! Default handlers: one per verb named in spec.md §4.5.
//!
//! Each module groups a handful of related verbs the way the rest of this
//! crate groups related concerns, not because the spec names any such
//! grouping.

mod consumption;
mod containers;
mod devices;
mod manipulation;
mod movement;
mod observation;
mod senses;
mod system;

use wayfarer_data::VerbId;

use crate::action::HandlerRegistry;

/// Build the registry of default handlers, keyed by verb id. A game
/// blueprint's own handler table is layered on top of this by
/// `crate::loader`.
pub fn default_registry() -> HandlerRegistry {
    let mut reg = HandlerRegistry::new();

    reg.register(VerbId::new("look"), Box::new(observation::Look));
    reg.register(VerbId::new("examine"), Box::new(observation::Examine));
    reg.register(VerbId::new("inventory"), Box::new(observation::Inventory));

    reg.register(VerbId::new("take"), Box::new(manipulation::Take));
    reg.register(VerbId::new("drop"), Box::new(manipulation::Drop));
    reg.register(VerbId::new("put-in"), Box::new(manipulation::PutIn));
    reg.register(VerbId::new("put-on"), Box::new(manipulation::PutOn));
    reg.register(VerbId::new("wear"), Box::new(manipulation::Wear));
    reg.register(VerbId::new("remove"), Box::new(manipulation::Remove));

    reg.register(VerbId::new("open"), Box::new(containers::Open));
    reg.register(VerbId::new("close"), Box::new(containers::Close));
    reg.register(VerbId::new("lock"), Box::new(containers::Lock));
    reg.register(VerbId::new("unlock"), Box::new(containers::Unlock));

    reg.register(VerbId::new("turn-on"), Box::new(devices::TurnOn));
    reg.register(VerbId::new("turn-off"), Box::new(devices::TurnOff));
    reg.register(VerbId::new("read"), Box::new(devices::Read));

    reg.register(VerbId::new("go"), Box::new(movement::Go));
    reg.register(VerbId::new("enter"), Box::new(movement::Enter));
    reg.register(VerbId::new("exit"), Box::new(movement::Exit));

    reg.register(VerbId::new("smell"), Box::new(senses::Smell));
    reg.register(VerbId::new("listen"), Box::new(senses::Listen));
    reg.register(VerbId::new("taste"), Box::new(senses::Taste));
    reg.register(VerbId::new("touch"), Box::new(senses::Touch));

    reg.register(VerbId::new("eat"), Box::new(consumption::Eat));
    reg.register(VerbId::new("drink"), Box::new(consumption::Drink));

    reg.register(VerbId::new("wait"), Box::new(system::Wait));
    reg.register(VerbId::new("score"), Box::new(system::Score));
    reg.register(VerbId::new("quit"), Box::new(system::Quit));
    reg.register(VerbId::new("help"), Box::new(system::Help));
    reg.register(VerbId::new("verbose"), Box::new(system::Verbose));
    reg.register(VerbId::new("brief"), Box::new(system::Brief));
    reg.register(VerbId::new("think-about"), Box::new(system::ThinkAbout));

    reg
}
