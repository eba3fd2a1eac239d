//! Tokeniser and syntax matcher: turns a raw input line into a [`Command`].
//!
//! See spec.md §4.3. The parser never mutates `GameState`; it only reads
//! through the vocabulary and the scope resolver to resolve nouns to
//! entities.

use thiserror::Error;
use wayfarer_data::{Direction, ItemId, SlotDef, VerbId};

use crate::scope;
use crate::state::GameState;
use crate::vocabulary::Vocabulary;

/// A fully resolved player command, ready for dispatch to an action
/// handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: VerbId,
    pub direct_objects: Vec<ItemId>,
    pub indirect_objects: Vec<ItemId>,
    pub dobj_modifiers: Vec<String>,
    pub iobj_modifiers: Vec<String>,
    pub preposition: Option<String>,
    pub direction: Option<Direction>,
    pub is_all: bool,
    pub raw_input: String,
}

/// Why parsing failed. Surfaced verbatim to the engine, which renders it
/// through the message provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("I don't know the word \"{0}\".")]
    UnknownWord(String),
    #[error("I don't understand that sentence.")]
    NoVerb,
    #[error("I don't understand what you want to do with that.")]
    NoMatchingSyntax,
    #[error("which do you mean: {0}?")]
    AmbiguousReference(Vec<ItemId>),
    #[error("I don't know what you're referring to.")]
    PronounUnbound(String),
    #[error("You can't see any such thing.")]
    ObjectNotInScope(String),
}

const ALL_WORDS: [&str; 2] = ["all", "everything"];

/// Lower-case, split on whitespace, drop noise words and bare punctuation,
/// collapse adjacent repeated tokens.
fn tokenize(input: &str, vocab: &Vocabulary) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in input.split_whitespace() {
        let cleaned: String =
            raw.chars().filter(|c| c.is_alphanumeric() || *c == '-' || *c == '\'').collect();
        if cleaned.is_empty() {
            continue;
        }
        let lower = cleaned.to_lowercase();
        if vocab.is_noise_word(&lower) {
            continue;
        }
        if tokens.last() == Some(&lower) {
            continue;
        }
        tokens.push(lower);
    }
    tokens
}

/// Parse one line of input against the current vocabulary and world
/// snapshot.
pub fn parse(input: &str, vocab: &Vocabulary, state: &GameState) -> Result<Command, ParseError> {
    let tokens = tokenize(input, vocab);
    if tokens.is_empty() {
        return Err(ParseError::NoVerb);
    }

    if tokens.len() == 1 {
        if let Some(dir) = vocab.direction_for_word(&tokens[0]) {
            return Ok(synth_go(input, dir));
        }
    }

    // A surface word may trigger more than one verb id (`put` -> `put-in`
    // / `put-on`); try each candidate's syntax rules in turn, per spec.md
    // §4.3 step 3, generalized over the homonym set.
    let candidates = vocab.verbs_for_word(&tokens[0]);
    if candidates.is_empty() {
        if vocab.direction_for_word(&tokens[0]).is_none() {
            return Err(ParseError::UnknownWord(tokens[0].clone()));
        }
        return Err(ParseError::NoVerb);
    }
    let rest = &tokens[1..];

    if rest.len() == 1 {
        if let Some(dir) = vocab.direction_for_word(&rest[0]) {
            let all_bare = candidates.iter().all(|v| vocab.verb_entry(v).map(|e| e.syntax.is_empty()).unwrap_or(true));
            if all_bare {
                return Ok(synth_go(input, dir));
            }
        }
    }

    let mut first_err: Option<ParseError> = None;
    for verb_id in &candidates {
        let Some(entry) = vocab.verb_entry(verb_id) else { continue };
        for rule in &entry.syntax {
            match try_match_rule(input, verb_id, rule, rest, vocab, state) {
                Ok(Some(cmd)) => return Ok(cmd),
                Ok(None) => {}
                Err(err) => { first_err.get_or_insert(err); }
            };
        }
    }

    // No declared syntax rules matched but there's exactly one trailing
    // noun phrase: fall back to treating it as a bare direct object.
    if !rest.is_empty() {
        for verb_id in &candidates {
            match try_match_rule(input, verb_id, &SyntaxRuleDefFallback::direct_object_only(), rest, vocab, state) {
                Ok(Some(cmd)) => return Ok(cmd),
                Ok(None) => {}
                Err(err) => { first_err.get_or_insert(err); }
            };
        }
        return Err(first_err.unwrap_or(ParseError::NoMatchingSyntax));
    }

    if let Some(err) = first_err {
        return Err(err);
    }

    Ok(Command {
        verb: candidates[0].clone(),
        direct_objects: vec![],
        indirect_objects: vec![],
        dobj_modifiers: vec![],
        iobj_modifiers: vec![],
        preposition: None,
        direction: None,
        is_all: false,
        raw_input: input.to_string(),
    })
}

/// A tiny shim so the "no declared syntax" fallback can reuse
/// `try_match_rule` without constructing a real `wayfarer_data::SyntaxRuleDef`
/// through its normal (blueprint-authoring) constructors.
struct SyntaxRuleDefFallback;
impl SyntaxRuleDefFallback {
    fn direct_object_only() -> wayfarer_data::SyntaxRuleDef {
        wayfarer_data::SyntaxRuleDef {
            slots: vec![SlotDef::DirectObject { requires_reachable: true }],
        }
    }
}

fn synth_go(raw_input: &str, direction: Direction) -> Command {
    Command {
        verb: VerbId::new("go"),
        direct_objects: vec![],
        indirect_objects: vec![],
        dobj_modifiers: vec![],
        iobj_modifiers: vec![],
        preposition: None,
        direction: Some(direction),
        is_all: false,
        raw_input: raw_input.to_string(),
    }
}

fn try_match_rule(
    raw_input: &str,
    verb: &VerbId,
    rule: &wayfarer_data::SyntaxRuleDef,
    tokens: &[String],
    vocab: &Vocabulary,
    state: &GameState,
) -> Result<Option<Command>, ParseError> {
    let mut direct_objects = Vec::new();
    let mut indirect_objects = Vec::new();
    let mut dobj_modifiers = Vec::new();
    let mut iobj_modifiers = Vec::new();
    let mut preposition = None;
    let mut direction = None;
    let mut is_all = false;

    let mut pos = 0usize;
    for slot in &rule.slots {
        match slot {
            SlotDef::DirectObject { requires_reachable } => {
                let (span, next) = take_noun_phrase(tokens, pos, vocab);
                if span.is_empty() {
                    return Ok(None);
                }
                pos = next;
                if span.iter().any(|w| ALL_WORDS.contains(&w.as_str())) {
                    is_all = true;
                    direct_objects = scope::reachable_by_player(state).into_iter().collect();
                    continue;
                }
                let (mods, ids) = resolve_noun_phrase(&span, vocab, state, *requires_reachable)?;
                dobj_modifiers = mods;
                direct_objects = ids;
            }
            SlotDef::IndirectObject { requires_reachable, requires_container } => {
                let (span, next) = take_noun_phrase(tokens, pos, vocab);
                if span.is_empty() {
                    return Ok(None);
                }
                pos = next;
                let (mods, ids) = resolve_noun_phrase(&span, vocab, state, *requires_reachable)?;
                if *requires_container {
                    let filtered: Vec<ItemId> = ids
                        .into_iter()
                        .filter(|id| {
                            state
                                .item(id)
                                .map(|it| it.flag(&wayfarer_data::PropertyId::new("container")))
                                .unwrap_or(false)
                        })
                        .collect();
                    indirect_objects = filtered;
                } else {
                    indirect_objects = ids;
                }
                iobj_modifiers = mods;
            }
            SlotDef::Preposition(expected) => {
                if pos >= tokens.len() || !vocab.is_preposition(&tokens[pos]) {
                    return Ok(None);
                }
                if let Some(word) = expected {
                    if &tokens[pos] != word {
                        return Ok(None);
                    }
                }
                preposition = Some(tokens[pos].clone());
                pos += 1;
            }
            SlotDef::Particle(word) => {
                if pos >= tokens.len() || &tokens[pos] != word {
                    return Ok(None);
                }
                pos += 1;
            }
            SlotDef::Direction => {
                if pos >= tokens.len() {
                    return Ok(None);
                }
                match vocab.direction_for_word(&tokens[pos]) {
                    Some(dir) => {
                        direction = Some(dir);
                        pos += 1;
                    }
                    None => return Ok(None),
                }
            }
        }
    }

    if pos != tokens.len() {
        return Ok(None);
    }

    Ok(Some(Command {
        verb: verb.clone(),
        direct_objects,
        indirect_objects,
        dobj_modifiers,
        iobj_modifiers,
        preposition,
        direction,
        is_all,
        raw_input: raw_input.to_string(),
    }))
}

/// Consume the longest run of tokens starting at `start` that are either
/// adjectives or a noun, stopping at the first preposition/particle word.
fn take_noun_phrase(tokens: &[String], start: usize, vocab: &Vocabulary) -> (Vec<String>, usize) {
    let mut end = start;
    while end < tokens.len() {
        let word = &tokens[end];
        if vocab.is_preposition(word) && end > start {
            break;
        }
        end += 1;
    }
    (tokens[start..end].to_vec(), end)
}

/// Split a noun-phrase span into adjective tokens and a trailing noun
/// token, then resolve to candidate item ids per spec.md §4.3 step 4.
fn resolve_noun_phrase(
    span: &[String],
    vocab: &Vocabulary,
    state: &GameState,
    requires_reachable: bool,
) -> Result<(Vec<String>, Vec<ItemId>), ParseError> {
    if span.is_empty() {
        return Ok((vec![], vec![]));
    }
    if span.len() == 1 && vocab.is_pronoun(&span[0]) {
        let id = resolve_pronoun(&span[0], state)?;
        if requires_reachable {
            let reachable = scope::reachable_by_player(state);
            if !reachable.contains(&id) {
                return Err(ParseError::ObjectNotInScope(span[0].clone()));
            }
        }
        return Ok((vec![], vec![id]));
    }
    let noun = span.last().unwrap().clone();
    let adjectives: Vec<String> = span[..span.len() - 1].to_vec();

    for adj in &adjectives {
        if !vocab.is_adjective(adj) {
            return Err(ParseError::UnknownWord(adj.clone()));
        }
    }

    let mut candidates = vocab.items_for_noun(&noun);
    if candidates.is_empty() && vocab.direction_for_word(&noun).is_none() && !ALL_WORDS.contains(&noun.as_str()) {
        return Err(ParseError::UnknownWord(noun));
    }

    if !adjectives.is_empty() {
        let mut narrowed = candidates.clone();
        for adj in &adjectives {
            let matching = vocab.items_for_adjective(adj);
            narrowed = narrowed.intersection(&matching).cloned().collect();
        }
        if narrowed.is_empty() {
            // fall back to noun-only match, per spec.md §4.3 step 4.
        } else {
            candidates = narrowed;
        }
    }

    if requires_reachable {
        let reachable = scope::reachable_by_player(state);
        candidates = candidates.intersection(&reachable).cloned().collect();
        if candidates.is_empty() {
            return Err(ParseError::ObjectNotInScope(noun));
        }
    }

    if candidates.len() > 1 {
        let mut sorted: Vec<ItemId> = candidates.into_iter().collect();
        sorted.sort();
        return Err(ParseError::AmbiguousReference(sorted));
    }

    Ok((adjectives, candidates.into_iter().collect()))
}

/// Resolve a pronoun ("it", "them") against the current bindings.
pub fn resolve_pronoun(word: &str, state: &GameState) -> Result<ItemId, ParseError> {
    state.pronoun(word).cloned().ok_or_else(|| ParseError::PronounUnbound(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PropertyKey, StateChange};
    use crate::world::{Item, Location, Player};
    use std::collections::BTreeMap;
    use wayfarer_data::{GameDef, ItemDef, ItemFlags, LocationDef, LocationFlags, Parent, PlayerDef, PropertyId, SlotDef, SyntaxRuleDef, Value, VerbDef};

    fn item_def(id: &str, name: &str, adjectives: &[&str], flags: ItemFlags) -> ItemDef {
        ItemDef {
            id: ItemId::new(id),
            name: name.into(),
            adjectives: adjectives.iter().map(|s| s.to_string()).collect(),
            synonyms: Default::default(),
            short_description: format!("a {name}"),
            first_description: None,
            long_description: None,
            read_text: None,
            capacity: 0,
            size: 1,
            parent: Parent::Location(LocationId::new("start")),
            flags,
            lock_key: None,
        }
    }

    fn def_with_keys() -> GameDef {
        GameDef {
            title: "t".into(),
            abbreviated_title: "t".into(),
            introduction: String::new(),
            release: String::new(),
            maximum_score: 0,
            player: PlayerDef { starting_location: LocationId::new("start"), carrying_capacity: 10, sheet: Default::default() },
            items: vec![
                item_def("brass-key", "key", &["brass"], ItemFlags { takable: true, ..Default::default() }),
                item_def("iron-key", "key", &["iron"], ItemFlags { takable: true, ..Default::default() }),
            ],
            locations: vec![LocationDef {
                id: LocationId::new("start"),
                name: "Start".into(),
                description: "a room".into(),
                exits: vec![],
                scenery_items: Default::default(),
                flags: LocationFlags { inherently_lit: true, ..Default::default() },
            }],
            verbs: vec![VerbDef {
                id: VerbId::new("take"),
                synonyms: BTreeSet::from(["get".to_string()]),
                syntax: vec![SyntaxRuleDef { slots: vec![SlotDef::DirectObject { requires_reachable: true }] }],
                requires_light: false,
            }],
            fuses: vec![],
            daemons: vec![],
        }
    }

    use std::collections::BTreeSet;

    fn build_state(def: &GameDef) -> GameState {
        let mut items = BTreeMap::new();
        for id in &def.items {
            items.insert(
                id.id.clone(),
                Item {
                    id: id.id.clone(),
                    name: id.name.clone(),
                    adjectives: id.adjectives.clone(),
                    synonyms: id.synonyms.clone(),
                    short_description: id.short_description.clone(),
                    first_description: None,
                    long_description: None,
                    read_text: None,
                    capacity: 0,
                    size: 1,
                    parent: id.parent.clone(),
                    lock_key: None,
                    properties: BTreeMap::new(),
                },
            );
        }
        let mut locations = BTreeMap::new();
        for l in &def.locations {
            locations.insert(
                l.id.clone(),
                Location {
                    id: l.id.clone(),
                    name: l.name.clone(),
                    description: l.description.clone(),
                    exits: vec![],
                    scenery_items: l.scenery_items.clone(),
                    properties: {
                        let mut p = BTreeMap::new();
                        p.insert(PropertyId::new("inherently_lit"), Value::Bool(l.flags.inherently_lit));
                        p
                    },
                },
            );
        }
        let player = Player {
            location: def.player.starting_location.clone(),
            moves: 0,
            score: 0,
            carrying_capacity: def.player.carrying_capacity,
            sheet: Default::default(),
            properties: BTreeMap::new(),
        };
        GameState::new(items, locations, player, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn ambiguous_noun_without_adjective_is_reported() {
        let def = def_with_keys();
        let vocab = Vocabulary::from_def(&def);
        let state = build_state(&def);
        let err = parse("take key", &vocab, &state).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousReference(_)));
    }

    #[test]
    fn adjective_disambiguates() {
        let def = def_with_keys();
        let vocab = Vocabulary::from_def(&def);
        let state = build_state(&def);
        let cmd = parse("take brass key", &vocab, &state).unwrap();
        assert_eq!(cmd.direct_objects, vec![ItemId::new("brass-key")]);
    }

    #[test]
    fn bare_direction_synthesises_go() {
        let def = def_with_keys();
        let vocab = Vocabulary::from_def(&def);
        let state = build_state(&def);
        let cmd = parse("north", &vocab, &state).unwrap();
        assert_eq!(cmd.verb, VerbId::new("go"));
        assert_eq!(cmd.direction, Some(Direction::North));
    }

    #[test]
    fn unreachable_object_is_not_in_scope() {
        let def = def_with_keys();
        let vocab = Vocabulary::from_def(&def);
        let mut state = build_state(&def);
        state
            .apply(StateChange::set(PropertyKey::ItemParent(ItemId::new("brass-key")), Value::Parent(Parent::Nowhere)))
            .unwrap();
        let err = parse("take brass key", &vocab, &state).unwrap_err();
        assert!(matches!(err, ParseError::ObjectNotInScope(_)));
    }
}
