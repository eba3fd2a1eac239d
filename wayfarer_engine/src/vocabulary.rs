//! The lexicon: surface words mapped to verbs, items, locations,
//! directions, and prepositions.
//!
//! Built once at load time from a [`GameDef`]'s items and
//! [`VerbDef`](wayfarer_data::VerbDef)s, then consulted by the parser on
//! every turn. All lookups are lower-cased; punctuation is stripped by the
//! tokenizer before vocabulary lookups happen.

use std::collections::{BTreeMap, BTreeSet};

use wayfarer_data::{Direction, GameDef, ItemId, LocationId, SyntaxRuleDef, VerbId};

/// One verb's full vocabulary entry.
#[derive(Debug, Clone)]
pub struct VerbEntry {
    pub id: VerbId,
    pub synonyms: BTreeSet<String>,
    pub syntax: Vec<SyntaxRuleDef>,
    pub requires_light: bool,
}

/// The assembled vocabulary for a loaded game.
///
/// A single surface word may trigger more than one verb id — `put` is
/// shared between `put-in` and `put-on` (spec.md §9's Open Question
/// resolution keeps them as two verbs) — so each word maps to a *set* of
/// candidate verb ids; the parser tries each candidate's syntax rules in
/// turn until one matches (spec.md §4.3 step 3).
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    verbs_by_word: BTreeMap<String, BTreeSet<VerbId>>,
    verbs: BTreeMap<VerbId, VerbEntry>,
    noun_index: BTreeMap<String, BTreeSet<ItemId>>,
    adjective_index: BTreeMap<String, BTreeSet<ItemId>>,
    location_names: BTreeMap<String, LocationId>,
    directions: BTreeMap<String, Direction>,
    prepositions: BTreeSet<String>,
    pronouns: BTreeSet<String>,
    noise_words: BTreeSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary from a validated [`GameDef`].
    pub fn from_def(def: &GameDef) -> Self {
        let mut vocab = Vocabulary::with_defaults();

        for item in &def.items {
            let name_key = item.name.to_lowercase();
            vocab.noun_index.entry(name_key).or_default().insert(item.id.clone());
            for syn in &item.synonyms {
                vocab.noun_index.entry(syn.to_lowercase()).or_default().insert(item.id.clone());
            }
            for adj in &item.adjectives {
                vocab.adjective_index.entry(adj.to_lowercase()).or_default().insert(item.id.clone());
            }
        }

        for loc in &def.locations {
            vocab.location_names.insert(loc.name.to_lowercase(), loc.id.clone());
        }

        // spec.md §6 lists these as always-available standard commands, not
        // something every blueprint has to declare; a game's own `verbs`
        // entries are layered on top by id, overriding a standard verb's
        // grammar or adding synonyms to it.
        for verb in wayfarer_data::standard_verbs().into_iter().chain(def.verbs.iter().cloned()) {
            vocab.index_verb(&verb);
        }

        vocab
    }

    fn index_verb(&mut self, verb: &wayfarer_data::VerbDef) {
        self.verbs_by_word.entry(verb.id.key()).or_default().insert(verb.id.clone());
        for syn in &verb.synonyms {
            self.verbs_by_word.entry(syn.to_lowercase()).or_default().insert(verb.id.clone());
        }
        self.verbs.insert(
            verb.id.clone(),
            VerbEntry {
                id: verb.id.clone(),
                synonyms: verb.synonyms.clone(),
                syntax: verb.syntax.clone(),
                requires_light: verb.requires_light,
            },
        );
    }

    /// Directions, prepositions, pronouns, and noise words the parser
    /// relies on regardless of what the blueprint declares; a blueprint
    /// may still add more nouns/adjectives/verbs on top of these.
    fn with_defaults() -> Self {
        let mut directions = BTreeMap::new();
        for (words, dir) in [
            (&["n", "north"][..], Direction::North),
            (&["s", "south"][..], Direction::South),
            (&["e", "east"][..], Direction::East),
            (&["w", "west"][..], Direction::West),
            (&["ne", "northeast"][..], Direction::Northeast),
            (&["nw", "northwest"][..], Direction::Northwest),
            (&["se", "southeast"][..], Direction::Southeast),
            (&["sw", "southwest"][..], Direction::Southwest),
            (&["u", "up"][..], Direction::Up),
            (&["d", "down"][..], Direction::Down),
            (&["in", "enter"][..], Direction::In),
            (&["out", "exit"][..], Direction::Out),
        ] {
            for word in words {
                directions.insert(word.to_string(), dir);
            }
        }

        let prepositions: BTreeSet<String> =
            ["in", "on", "under", "behind", "with", "to", "from", "at", "into", "onto"]
                .into_iter()
                .map(String::from)
                .collect();

        let pronouns: BTreeSet<String> = ["it", "them"].into_iter().map(String::from).collect();

        let noise_words: BTreeSet<String> =
            ["the", "a", "an", "of", "please", "just"].into_iter().map(String::from).collect();

        Vocabulary {
            verbs_by_word: BTreeMap::new(),
            verbs: BTreeMap::new(),
            noun_index: BTreeMap::new(),
            adjective_index: BTreeMap::new(),
            location_names: BTreeMap::new(),
            directions,
            prepositions,
            pronouns,
            noise_words,
        }
    }

    /// Every verb id the given first word could trigger, in ascending id
    /// order so candidate matching is deterministic.
    pub fn verbs_for_word(&self, word: &str) -> Vec<VerbId> {
        self.verbs_by_word.get(word).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn verb_entry(&self, id: &VerbId) -> Option<&VerbEntry> {
        self.verbs.get(id)
    }

    pub fn direction_for_word(&self, word: &str) -> Option<Direction> {
        self.directions.get(word).copied()
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(word)
    }

    pub fn is_pronoun(&self, word: &str) -> bool {
        self.pronouns.contains(word)
    }

    pub fn is_noise_word(&self, word: &str) -> bool {
        self.noise_words.contains(word)
    }

    pub fn is_adjective(&self, word: &str) -> bool {
        self.adjective_index.contains_key(word)
    }

    pub fn items_for_noun(&self, word: &str) -> BTreeSet<ItemId> {
        self.noun_index.get(word).cloned().unwrap_or_default()
    }

    pub fn items_for_adjective(&self, word: &str) -> BTreeSet<ItemId> {
        self.adjective_index.get(word).cloned().unwrap_or_default()
    }

    pub fn location_for_name(&self, word: &str) -> Option<&LocationId> {
        self.location_names.get(word)
    }
}
