//! The message provider: the single seam through which every user-visible
//! string is produced, per spec.md §7 ("there are no literal strings in
//! the core").
//!
//! A blueprint may supply its own provider to localise or re-tone
//! narration; [`DefaultMessages`] supplies a default for every key the
//! core engine and its default handlers use.

use std::collections::BTreeMap;

/// Looks up narration text by a stable key.
///
/// Implementations should fall back to a built-in default for any key they
/// don't recognise rather than panicking, since new keys may be added by
/// future handlers.
pub trait MessageProvider: std::fmt::Debug {
    fn message(&self, key: &str) -> String;

    /// Render a message with `{0}`, `{1}`, ... placeholders substituted by
    /// position. Used for messages that need to name an object.
    fn render(&self, key: &str, args: &[&str]) -> String {
        let mut text = self.message(key);
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{i}}}"), arg);
        }
        text
    }
}

/// The built-in defaults named throughout the spec's boundary-behaviour
/// and scenario sections (dark rooms, disambiguation, pronoun binding,
/// container/lock failures, and so on).
#[derive(Debug, Clone)]
pub struct DefaultMessages {
    overrides: BTreeMap<String, String>,
}

impl Default for DefaultMessages {
    fn default() -> Self {
        DefaultMessages { overrides: BTreeMap::new() }
    }
}

impl DefaultMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider with author-supplied overrides layered over the
    /// built-in defaults.
    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        DefaultMessages { overrides }
    }

    fn builtin(key: &str) -> &'static str {
        match key {
            "dark_room" => "It is pitch dark. You can't see anything.",
            "cant_see_any_such_thing" => "You can't see any such thing.",
            "nothing_to_verb" => "There is nothing here to {0}.",
            "pronoun_unbound" => "I don't know what you're referring to.",
            "ambiguous_which" => "Which do you mean, {0}?",
            "unknown_word" => "I don't know the word \"{0}\".",
            "no_verb" => "I don't understand that sentence.",
            "no_matching_syntax" => "I don't understand what you want to do with that.",
            "not_reachable" => "You can't reach that from here.",
            "not_takable" => "You can't take that.",
            "already_held" => "You're already carrying that.",
            "container_closed" => "The {0} is closed.",
            "container_full" => "There's no more room in the {0}.",
            "door_locked" => "The {0} is locked.",
            "requires_light" => "It's too dark to do that.",
            "no_such_exit" => "You can't go that way.",
            "internal_invariant" => "Something has gone wrong and that can't be done.",
            "inventory_empty" => "You aren't carrying anything.",
            "turn_on_already" => "It's already on.",
            "turn_off_already" => "It's already off.",
            "turned_on" => "You turn on the {0}.",
            "turned_off" => "You turn off the {0}.",
            "opened" => "You open the {0}.",
            "closed" => "You close the {0}.",
            "already_open" => "That's already open.",
            "already_closed" => "That's already closed.",
            "unlock_wrong_key" => "That doesn't seem to unlock it.",
            "unlocked" => "You unlock the {0}.",
            "locked" => "You lock the {0}.",
            "cant_open" => "You can't open that.",
            "cant_close" => "You can't close that.",
            "cant_lock" => "That can't be locked.",
            "cant_unlock" => "That can't be unlocked.",
            "nothing_to_read" => "There's nothing written on that.",
            "taken" => "Taken.",
            "dropped" => "Dropped.",
            "worn" => "You put on the {0}.",
            "removed" => "You take off the {0}.",
            "not_wearable" => "You can't wear that.",
            "not_worn" => "You're not wearing that.",
            "put_in" => "You put the {0} in the {1}.",
            "put_on" => "You put the {0} on the {1}.",
            "not_a_container" => "You can't put anything in that.",
            "not_a_surface" => "You can't put anything on that.",
            "score" => "Your score is {0} out of {1}, in {2} moves.",
            "quit_confirm" => "Thanks for playing.",
            "waited" => "Time passes.",
            "fuse_fired" => "",
            "smell_default" => "You smell nothing unusual.",
            "listen_default" => "You hear nothing unusual.",
            "taste_default" => "You taste nothing unusual.",
            "touch_default" => "You feel nothing unusual.",
            "room_items" => "\nYou can see: {0}.",
            "inventory_list" => "You are carrying: {0}.",
            "help_text" => "Try simple commands like LOOK, TAKE, DROP, OPEN, GO NORTH, INVENTORY, or DIRECTIONS like N/S/E/W.",
            "verbose_on" => "Full location descriptions will now be shown every time.",
            "brief_on" => "Full location descriptions will only be shown on first visit.",
            "think_default_self" => "You consider your situation.",
            "think_default_item" => "You don't have any particular thoughts about the {0}.",
            "no_handler" => "I don't know how to do that.",
            "exit_door_closed" => "The way is closed.",
            "went_direction" => "You go {0}.\n{1}",
            "eaten" => "You eat the {0}.",
            "drunk" => "You drink the {0}.",
            "not_edible" => "That's not something you can eat.",
            "not_drinkable" => "That's not something you can drink.",
            _ => "",
        }
    }
}

impl MessageProvider for DefaultMessages {
    fn message(&self, key: &str) -> String {
        if let Some(text) = self.overrides.get(key) {
            return text.clone();
        }
        Self::builtin(key).to_string()
    }
}
