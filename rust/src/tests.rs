use crate::align::{align, generate_dual_level, similarity};
use crate::config::{DualLevelConfig, ExtensionPolicy, GenerationConfig, TrainConfig};
use crate::corpus::{read_corpus, tokenize};
use crate::engine::{diffuse, diffuse_traced, merge, merge_traced};
use crate::error::FibError;
use crate::expand::expand;
use crate::generate;
use crate::model::{CooccurrenceKey, CooccurrenceModel};
use crate::offsets::fibonacci_offsets;
use crate::persist::MODEL_FORMAT_VERSION;
use crate::scoring::{rank_candidates, score_candidates, score_pair};
use crate::sequence::{Placement, Sequence};
use crate::syllable::{split_all, SyllableSplitter, VowelGroupSplitter};
use crate::trace::{NullSink, Outcome, TraceEvent};
use crate::types::{Direction, GAP};
use proptest::prelude::*;
use std::io::Write;

const CORPUS: [&str; 9] = ["the", "cat", "sat", "on", "the", "mat", "the", "cat", "ran"];

fn scenario_model() -> CooccurrenceModel {
    CooccurrenceModel::build(&CORPUS, 4).expect("failed to build scenario model")
}

fn id(model: &CooccurrenceModel, token: &str) -> u32 {
    model
        .token_id(token)
        .unwrap_or_else(|| panic!("{token:?} missing from vocabulary"))
}

fn tokens_of(model: &CooccurrenceModel, ids: impl IntoIterator<Item = u32>) -> Vec<String> {
    ids.into_iter().map(|id| model.token(id).to_string()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-12,
        "expected {expected}, got {actual}"
    );
}

fn owned(tokens: &[&str]) -> Vec<Option<String>> {
    tokens
        .iter()
        .map(|token| (*token != GAP).then(|| token.to_string()))
        .collect()
}

#[test]
fn offsets_skip_unit_terms_and_respect_bound() {
    assert!(fibonacci_offsets(0).is_empty());
    assert!(fibonacci_offsets(1).is_empty());
    assert_eq!(fibonacci_offsets(2).as_slice(), &[2]);
    assert_eq!(fibonacci_offsets(3).as_slice(), &[2, 3]);
    assert_eq!(fibonacci_offsets(4).as_slice(), &[2, 3]);
    assert_eq!(
        fibonacci_offsets(200).as_slice(),
        &[2, 3, 5, 8, 13, 21, 34, 55, 89, 144]
    );
}

#[test]
fn forward_and_backward_counts_match_manual_counting() {
    let model = scenario_model();
    assert_eq!(model.offsets(), &[2, 3]);

    let the_two = model
        .counts(Direction::Forward, id(&model, "the"), 2)
        .expect("forward[the][2] should exist");
    assert_eq!(
        the_two
            .iter()
            .map(|(token, count)| (model.token(token).to_string(), count))
            .collect::<Vec<_>>(),
        vec![
            ("sat".to_string(), 1),
            ("the".to_string(), 1),
            ("ran".to_string(), 1)
        ]
    );
    assert_eq!(the_two.total(), 3);

    assert_eq!(model.observed(Direction::Forward, "the", 3, "on"), 1);
    assert_eq!(model.observed(Direction::Forward, "the", 3, "cat"), 1);
    assert_eq!(model.observed(Direction::Backward, "cat", 2, "mat"), 1);
    assert_eq!(model.observed(Direction::Backward, "cat", 2, "the"), 0);
    assert_eq!(model.observed(Direction::Forward, "the", 5, "mat"), 0);
    assert_eq!(model.observed(Direction::Forward, "dog", 2, "the"), 0);
}

#[test]
fn model_build_is_deterministic() {
    assert_eq!(scenario_model(), scenario_model());
}

#[test]
fn forward_probabilities_sum_to_one() {
    let model = scenario_model();
    for counter in model.forward.values() {
        let sum: f64 = counter
            .iter()
            .map(|(token, _)| counter.probability(token))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9, "probabilities summed to {sum}");
    }
}

#[test]
fn score_pair_uses_reverse_table_for_confirmation() {
    let model = scenario_model();
    let (the, sat, ran, cat) = (
        id(&model, "the"),
        id(&model, "sat"),
        id(&model, "ran"),
        id(&model, "cat"),
    );

    let (forward, backward) = score_pair(&model, the, sat, 2, Direction::Forward);
    assert_close(forward, 1.0 / 3.0);
    assert_close(backward, 1.0);

    let (forward, backward) = score_pair(&model, ran, the, 2, Direction::Backward);
    assert_close(forward, 1.0 / 3.0);
    assert_close(backward, 1.0);

    assert_eq!(score_pair(&model, the, cat, 2, Direction::Forward), (0.0, 0.0));
}

#[test]
fn ranking_is_stable_on_equal_scores() {
    let model = scenario_model();
    let the = id(&model, "the");

    let ranked = rank_candidates(&model, the, 2, Direction::Forward);
    assert_eq!(
        tokens_of(&model, ranked.iter().map(|c| c.token)),
        vec!["sat", "ran", "the"]
    );
    assert_close(ranked[0].combined_score, 1.0 / 3.0);
    assert_close(ranked[1].combined_score, 1.0 / 3.0);
    assert_close(ranked[2].combined_score, 1.0 / 6.0);

    let ranked = rank_candidates(&model, the, 3, Direction::Forward);
    assert_eq!(
        tokens_of(&model, ranked.iter().map(|c| c.token)),
        vec!["on", "cat"]
    );
}

#[test]
fn unconfirmed_candidates_are_dropped() {
    let mut model = scenario_model();
    let (the, ran) = (id(&model, "the"), id(&model, "ran"));
    model.backward.remove(&CooccurrenceKey {
        anchor: ran,
        offset: 2,
    });

    let scored = score_candidates(&model, the, 2, Direction::Forward);
    assert_eq!(
        tokens_of(&model, scored.iter().map(|c| c.token)),
        vec!["sat", "the"]
    );
    assert_eq!(model.observed(Direction::Forward, "the", 2, "ran"), 1);
}

#[test]
fn single_seed_expands_forward() {
    let model = scenario_model();
    let expansion = expand(&model, "the", 1, 6);

    assert_eq!(
        expansion.proposals.keys().copied().collect::<Vec<_>>(),
        vec![3, 4]
    );
    assert_eq!(model.token(expansion.proposals[&3].token), "sat");
    assert_eq!(model.token(expansion.proposals[&4].token), "on");
    assert_ne!(model.token(expansion.proposals[&3].token), "cat");

    let at_four = &expansion.analysis[&4];
    assert_eq!(at_four.offset, 3);
    assert_eq!(model.token(at_four.from_seed), "the");
    assert_eq!(
        tokens_of(&model, at_four.candidates.iter().map(|c| c.token)),
        vec!["on", "cat"]
    );
}

#[test]
fn single_seed_expands_backward_with_signed_offsets() {
    let model = scenario_model();
    let expansion = expand(&model, "ran", 5, 9);

    assert_eq!(
        expansion.proposals.keys().copied().collect::<Vec<_>>(),
        vec![2, 3]
    );
    let mat = expansion.proposals[&2];
    assert_eq!(model.token(mat.token), "mat");
    assert_close(mat.combined_score, 1.0);
    assert_eq!(expansion.analysis[&2].offset, -3);

    let the = expansion.proposals[&3];
    assert_eq!(model.token(the.token), "the");
    assert_close(the.forward_prob, 1.0 / 3.0);
    assert_close(the.backward_prob, 1.0);
    assert_eq!(expansion.analysis[&3].offset, -2);
}

#[test]
fn expansion_without_coverage_is_empty() {
    let model = scenario_model();
    assert!(expand(&model, "dog", 1, 10).is_empty());
    assert!(expand(&model, "the", 6, 6).is_empty());
    assert!(expand(&model, "the", 9, 6).is_empty());
}

#[test]
fn merge_fills_reachable_positions() {
    let model = scenario_model();
    let generation = merge(&model, &["the"], 6);

    assert_eq!(
        generation.rendered(),
        vec!["the", GAP, "sat", "on", GAP, GAP]
    );
    assert_eq!(generation.text(), "the sat on");
    assert_eq!(generation.analysis[&1].seed.as_deref(), Some("the"));
    assert_eq!(generation.analysis[&3].competing.len(), 1);
    assert!(generation.analysis.get(&2).is_none());
}

#[test]
fn merge_never_displaces_seeds() {
    let model = scenario_model();
    // "the" proposes "sat" at 3 and "ran" proposes "the" at 1; both land on seeds.
    let generation = merge(&model, &["the", "dog", "ran"], 5);
    let rendered = generation.rendered();
    assert_eq!(&rendered[..3], &["the", "dog", "ran"]);
    assert_eq!(generation.analysis[&3].seed.as_deref(), Some("ran"));
    assert!(!generation.analysis[&3].competing.is_empty());
}

#[test]
fn offer_applies_merge_precedence() {
    let model = scenario_model();
    let mut sequence = Sequence::seeded(&model, &["the"], 5, &mut NullSink);
    let candidate = |token: &str, score: f64| Placement {
        token: token.to_string(),
        id: model.token_id(token),
        forward_prob: score,
        backward_prob: 1.0,
        score,
        pass: 1,
    };

    assert_eq!(
        sequence.offer(1, candidate("cat", 0.9)),
        Outcome::KeepsSeed {
            seed: "the".to_string()
        }
    );
    assert_eq!(sequence.offer(3, candidate("sat", 0.2)), Outcome::FillsGap);
    assert_eq!(
        sequence.offer(3, candidate("mat", 0.2)),
        Outcome::Keeps {
            existing: "sat".to_string(),
            existing_score: 0.2
        }
    );
    assert_eq!(
        sequence.offer(3, candidate("on", 0.5)),
        Outcome::Replaces {
            previous: "sat".to_string(),
            previous_score: 0.2
        }
    );
    assert_eq!(
        sequence.tokens(),
        owned(&["the", GAP, "on", GAP, GAP])
    );
}

#[test]
fn empty_seed_list_yields_all_gaps() {
    let model = scenario_model();
    let seeds: [&str; 0] = [];
    assert_eq!(merge(&model, &seeds, 4).tokens(), vec![None; 4]);
    assert_eq!(diffuse(&model, &seeds, 4, 3).tokens(), vec![None; 4]);
}

#[test]
fn uncovered_seed_degenerates_to_seed_plus_gaps() {
    let model = scenario_model();
    let generation = diffuse(&model, &["dog"], 5, 3);
    assert_eq!(generation.rendered(), vec!["dog", GAP, GAP, GAP, GAP]);
}

#[test]
fn seeds_past_length_are_dropped() {
    let model = scenario_model();
    let generation = merge(&model, &["the", "cat", "sat"], 2);
    assert_eq!(generation.rendered(), vec!["the", "cat"]);
}

#[test]
fn diffusion_revises_with_later_anchors() {
    let model = scenario_model();
    let generation = diffuse(&model, &["the"], 6, 2);

    assert_eq!(
        generation.rendered(),
        vec!["the", "cat", "sat", "on", "the", "mat"]
    );

    let sequence = &generation.sequence;
    assert_eq!(sequence.get(1).map(|p| p.pass), Some(0));
    assert_eq!(sequence.get(3).map(|p| p.pass), Some(1));
    assert_eq!(sequence.get(2).map(|p| p.pass), Some(2));
    assert_close(sequence.get(5).map(|p| p.score).unwrap_or_default(), 1.0 / 6.0);
    assert_close(sequence.get(6).map(|p| p.score).unwrap_or_default(), 0.5);

    let history = &generation.analysis[&6].history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].pass, 2);
    assert_eq!(history[0].source, Some(4));
    assert_eq!(history[0].proposed, "mat");
    assert_eq!(history[0].candidates.len(), 2);

    let seed_history = &generation.analysis[&1].history;
    assert_eq!(seed_history[0].pass, 0);
    assert_eq!(seed_history[0].source, None);
    assert_eq!(seed_history[0].candidates.len(), 1);
    assert_eq!(model.token(seed_history[0].candidates[0].token), "the");
    assert_eq!(seed_history[0].candidates[0].combined_score, 1.0);
    assert!(seed_history.iter().all(|record| record.chosen == "the"));
}

#[test]
fn third_pass_replaces_weaker_generated_token() {
    let model = scenario_model();
    let mut events = Vec::new();
    let generation = diffuse_traced(&model, &["the"], 6, 3, &mut events);

    assert_eq!(
        generation.rendered(),
        vec!["the", "cat", "sat", "on", "the", "mat"]
    );
    let fifth = generation.sequence.get(5).expect("position 5 should be filled");
    assert_eq!(fifth.pass, 3);
    assert_close(fifth.score, 0.25);
    assert_close(fifth.forward_prob, 1.0);
    assert_close(fifth.backward_prob, 0.5);

    let replaced = events
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Decision {
                pass: Some(pass),
                position,
                outcome: outcome @ Outcome::Replaces { .. },
                ..
            } => Some((*pass, *position, outcome.clone())),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(replaced.len(), 1);
    let (pass, position, outcome) = &replaced[0];
    assert_eq!((*pass, *position), (3, 5));
    assert!(outcome.installed());
    let Outcome::Replaces {
        previous,
        previous_score,
    } = outcome
    else {
        unreachable!()
    };
    assert_eq!(previous, "the");
    assert_close(*previous_score, 1.0 / 6.0);

    let history = &generation.analysis[&5].history;
    let last = history.last().expect("position 5 should have history");
    assert_eq!(last.pass, 3);
    assert_eq!(last.source, Some(2));
    assert_eq!(last.proposed, "the");
    assert_eq!(last.chosen, "the");
    assert_eq!(last.candidates.len(), 2);

    let kept = events.iter().any(|event| {
        matches!(
            event,
            TraceEvent::Decision {
                pass: Some(3),
                position: 6,
                outcome: Outcome::Keeps { .. },
                ..
            }
        )
    });
    assert!(kept);
}

#[test]
fn extra_passes_reach_a_fixed_point() {
    let model = scenario_model();
    let third = diffuse(&model, &["the"], 6, 3);
    let fourth = diffuse(&model, &["the"], 6, 4);
    assert_eq!(third.sequence, fourth.sequence);

    let mut events = Vec::new();
    diffuse_traced(&model, &["the"], 6, 4, &mut events);
    let installed_in_fourth = events.iter().any(|event| match event {
        TraceEvent::Decision {
            pass: Some(4),
            outcome,
            ..
        } => outcome.installed(),
        _ => false,
    });
    assert!(!installed_in_fourth);
}

#[test]
fn pass_record_reports_seed_over_rejected_proposal() {
    let model = scenario_model();
    let generation = diffuse(&model, &["the", "dog", "ran"], 5, 1);

    let history = &generation.analysis[&3].history;
    assert_eq!(history[0].pass, 0);
    assert_eq!(model.token(history[0].candidates[0].token), "ran");
    let first_pass = &history[1];
    assert_eq!(first_pass.source, Some(1));
    assert_eq!(first_pass.proposed, "sat");
    assert_eq!(first_pass.chosen, "ran");

    assert!(generation.analysis[&2].history[0].candidates.is_empty());
}

#[test]
fn single_pass_diffusion_matches_merge() {
    let model = scenario_model();
    for seeds in [vec!["the"], vec!["the", "cat"], vec!["ran", "the", "on"]] {
        assert_eq!(
            diffuse(&model, &seeds, 9, 1).tokens(),
            merge(&model, &seeds, 9).tokens()
        );
    }
}

#[test]
fn zero_pass_diffusion_keeps_only_seeds() {
    let model = scenario_model();
    assert_eq!(
        diffuse(&model, &["the", "cat"], 4, 0).rendered(),
        vec!["the", "cat", GAP, GAP]
    );
}

#[test]
fn diffusion_is_idempotent_on_the_parallel_path() {
    let tokens = tokenize(&"the cat sat on the mat and the dog ran after the cat ".repeat(30));
    let model = CooccurrenceModel::build(&tokens, 34).expect("failed to build model");
    let seeds = &tokens[..80];

    let first = diffuse(&model, seeds, 120, 3);
    let second = diffuse(&model, seeds, 120, 3);
    assert_eq!(first, second);
    for (ix, seed) in seeds.iter().enumerate() {
        assert_eq!(first.sequence.get(ix + 1).map(|p| p.token.as_str()), Some(seed.as_str()));
    }
}

#[test]
fn merge_trace_reports_decisions_in_order() {
    let model = scenario_model();
    let mut events = Vec::new();
    merge_traced(&model, &["the"], 6, &mut events);

    assert_eq!(
        events[0],
        TraceEvent::Seed {
            position: 1,
            token: "the".to_string()
        }
    );
    let decisions = events
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Decision {
                position, outcome, ..
            } => Some((*position, outcome.clone())),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(decisions, vec![(3, Outcome::FillsGap), (4, Outcome::FillsGap)]);

    let finals = events
        .iter()
        .filter(|event| matches!(event, TraceEvent::Final { .. }))
        .count();
    assert_eq!(finals, 6);

    let decision = events
        .iter()
        .find(|event| matches!(event, TraceEvent::Decision { .. }))
        .expect("expected a decision event");
    assert_eq!(
        decision.to_string(),
        "pos 3: 'sat' (F:33.3% B:100.0% C:0.333) [fills gap]"
    );
}

#[test]
fn diffusion_trace_is_reproducible() {
    let model = scenario_model();
    let mut first = Vec::new();
    let mut second = Vec::new();
    diffuse_traced(&model, &["the"], 6, 2, &mut first);
    diffuse_traced(&model, &["the"], 6, 2, &mut second);
    assert_eq!(first, second);
    assert!(first.iter().any(|event| matches!(
        event,
        TraceEvent::Expansion {
            pass: Some(2),
            position: 4,
            ..
        }
    )));
}

#[test]
fn model_round_trips_through_bytes() {
    let model = scenario_model();
    let mut bytes = Vec::new();
    model.write_to(&mut bytes).expect("failed to write model");

    let loaded = CooccurrenceModel::read_from(bytes.as_slice()).expect("failed to read model");
    assert_eq!(loaded, model);
    assert_eq!(
        merge(&loaded, &["the"], 6).tokens(),
        merge(&model, &["the"], 6).tokens()
    );

    let mut again = Vec::new();
    loaded.write_to(&mut again).expect("failed to write model");
    assert_eq!(again, bytes);
}

#[test]
fn model_round_trips_through_files() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("model.bin");
    let model = scenario_model();

    model.save(&path).expect("failed to save model");
    let loaded = CooccurrenceModel::load(&path).expect("failed to load model");
    assert_eq!(loaded, model);
    assert_eq!(loaded.max_distance(), 4);
}

#[test]
fn persistence_failures_propagate() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    assert!(matches!(
        CooccurrenceModel::load(dir.path().join("missing.bin")),
        Err(FibError::Io(_))
    ));

    let wrong_version = bincode::serialize(&(MODEL_FORMAT_VERSION + 1)).expect("serialize");
    assert!(matches!(
        CooccurrenceModel::read_from(wrong_version.as_slice()),
        Err(FibError::IncompatibleModel { .. })
    ));

    let mut bytes = Vec::new();
    scenario_model().write_to(&mut bytes).expect("failed to write model");
    bytes.truncate(bytes.len() / 2);
    assert!(matches!(
        CooccurrenceModel::read_from(bytes.as_slice()),
        Err(FibError::Codec(_))
    ));
}

#[test]
fn tokenize_keeps_lowercase_alphabetic_words() {
    assert_eq!(
        tokenize("The Cat, sat! 42 on-the mat's"),
        vec!["the", "cat", "sat", "on", "the", "mat", "s"]
    );
    assert!(tokenize("123 ... !!").is_empty());
}

#[test]
fn train_file_reads_and_counts_corpus() {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    write!(file, "The cat sat on the mat. The cat ran!").expect("failed to write corpus");

    assert_eq!(read_corpus(file.path()).expect("failed to read corpus"), CORPUS);

    let config = TrainConfig {
        max_distance: 4,
        ..TrainConfig::default()
    };
    let model = CooccurrenceModel::train_file(file.path(), &config).expect("failed to train");
    assert_eq!(model, scenario_model());
}

#[test]
fn config_validation_rejects_invalid_values() {
    assert!(TrainConfig::default().validate().is_ok());
    assert!(matches!(
        TrainConfig {
            max_distance: 1,
            ..TrainConfig::default()
        }
        .validate(),
        Err(FibError::Config(_))
    ));
    assert!(TrainConfig {
        progress_interval: 0,
        ..TrainConfig::default()
    }
    .validate()
    .is_err());

    let model = scenario_model();
    let config = GenerationConfig {
        length: 0,
        passes: 1,
    };
    assert!(generate(&model, &["the"], &config).is_err());

    let config = GenerationConfig {
        length: 6,
        passes: 2,
    };
    assert_eq!(
        generate(&model, &["the"], &config)
            .expect("valid config")
            .tokens(),
        diffuse(&model, &["the"], 6, 2).tokens()
    );

    let dual = DualLevelConfig {
        extension: ExtensionPolicy {
            short_limit: 20,
            medium_limit: 10,
            ..ExtensionPolicy::default()
        },
        ..DualLevelConfig::default()
    };
    assert!(dual.validate().is_err());
}

#[test]
fn extension_policy_thresholds() {
    let policy = ExtensionPolicy::default();
    assert_eq!(policy.effective_length(12, 2), 25);
    assert_eq!(policy.effective_length(12, 5), 25);
    assert_eq!(policy.effective_length(12, 6), 25);
    assert_eq!(policy.effective_length(12, 15), 30);
    assert_eq!(policy.effective_length(12, 16), 28);
    assert_eq!(policy.effective_length(40, 10), 40);
}

#[test]
fn vowel_group_splitter_segments_words() {
    let splitter = VowelGroupSplitter;
    assert_eq!(splitter.split("cat"), vec!["cat"]);
    assert_eq!(splitter.split("hello"), vec!["hel", "lo"]);
    assert_eq!(splitter.split("water"), vec!["wa", "ter"]);
    assert_eq!(splitter.split("syllable"), vec!["syl", "lab", "le"]);
    assert_eq!(splitter.split("yes"), vec!["yes"]);
    assert_eq!(splitter.split("tsk"), vec!["tsk"]);
    assert_eq!(
        split_all(&splitter, &["hello", "cat"]),
        vec!["hel", "lo", "cat"]
    );
}

#[test]
fn similarity_prefers_own_syllables() {
    let splitter = VowelGroupSplitter;
    assert_eq!(similarity(&splitter, "cat", "cat"), 1.0);
    assert_eq!(similarity(&splitter, "hat", "hello"), 0.0);
    assert_eq!(similarity(&splitter, "lo", "hello"), 1.0);
    assert_eq!(similarity(&splitter, "ell", "hello"), 0.7);
    assert_eq!(similarity(&splitter, "bak", "bat"), 0.3);
    assert_eq!(similarity(&splitter, "cat", "hat"), 0.2);
    assert_eq!(similarity(&splitter, "c", "hat"), 0.0);
}

#[test]
fn alignment_picks_highest_similarity_and_consumes_words() {
    let splitter = VowelGroupSplitter;
    let alignment = align(&splitter, &owned(&["cat"]), &owned(&["hat", "cat"]));
    assert_eq!(alignment.combined, vec!["cat"]);
    assert_eq!(alignment.mapping.get(&0).map(String::as_str), Some("cat"));

    let alignment = align(
        &splitter,
        &owned(&["ca", GAP, "ca", "bak"]),
        &owned(&["cat", GAP, "bat"]),
    );
    assert_eq!(alignment.combined, vec!["cat", "ca", "bak"]);
    assert_eq!(alignment.mapping.len(), 1);
    assert_eq!(alignment.mapping.get(&0).map(String::as_str), Some("cat"));
}

#[test]
fn closure_splitters_plug_into_alignment() {
    let by_halves = |token: &str| -> Vec<String> {
        let mid = token.len() / 2;
        vec![token[..mid].to_string(), token[mid..].to_string()]
    };
    assert_eq!(similarity(&by_halves, "ca", "cats"), 1.0);
}

#[test]
fn dual_level_generation_aligns_seed_words() {
    let splitter = VowelGroupSplitter;
    let words = tokenize(&"the cat sat on the mat the cat ran ".repeat(4));
    let syllables = split_all(&splitter, &words);
    let word_model = CooccurrenceModel::build(&words, 21).expect("failed to build word model");
    let syllable_model =
        CooccurrenceModel::build(&syllables, 21).expect("failed to build syllable model");

    let output = generate_dual_level(
        &syllable_model,
        &word_model,
        &["the", "cat"],
        &splitter,
        &DualLevelConfig::default(),
    )
    .expect("dual-level generation failed");

    assert_eq!(output.seed_syllables, vec!["the", "cat"]);
    assert_eq!(output.effective_length, 25);
    assert_eq!(output.syllables.len(), 25);
    assert_eq!(output.words.len(), 25 / 2 + 2);
    assert_eq!(output.alignments.get(&0).map(String::as_str), Some("the"));
    assert_eq!(output.alignments.get(&1).map(String::as_str), Some("cat"));
    assert!(output.word_enhanced_version.starts_with("the cat"));
    assert!(output.syllable_version.starts_with("the cat"));
    assert_eq!(
        output.word_enhanced_version.split(' ').count(),
        output.syllables.iter().flatten().count()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn seeds_survive_every_pass(
        corpus in proptest::collection::vec("[a-d]", 4..60),
        seeds in proptest::collection::vec("[a-e]", 0..5),
        length in 1usize..20,
        passes in 0usize..4,
    ) {
        let model = CooccurrenceModel::build(&corpus, 13).expect("failed to build model");
        let merged = merge(&model, &seeds, length).tokens();
        let diffused = diffuse(&model, &seeds, length, passes).tokens();

        prop_assert_eq!(merged.len(), length);
        prop_assert_eq!(diffused.len(), length);
        for (ix, seed) in seeds.iter().take(length).enumerate() {
            prop_assert_eq!(merged[ix].as_deref(), Some(seed.as_str()));
            prop_assert_eq!(diffused[ix].as_deref(), Some(seed.as_str()));
        }
        for token in merged.iter().chain(diffused.iter()).flatten() {
            prop_assert!(model.token_id(token).is_some() || seeds.contains(token));
        }
    }

    #[test]
    fn single_pass_diffusion_equals_merge(
        corpus in proptest::collection::vec("[a-c]", 4..60),
        seeds in proptest::collection::vec("[a-c]", 0..5),
        length in 1usize..24,
    ) {
        let model = CooccurrenceModel::build(&corpus, 21).expect("failed to build model");
        prop_assert_eq!(
            diffuse(&model, &seeds, length, 1).tokens(),
            merge(&model, &seeds, length).tokens()
        );
    }

    #[test]
    fn scored_candidates_have_support_in_both_directions(
        corpus in proptest::collection::vec("[a-d]", 4..80),
        offset_ix in 0usize..4,
    ) {
        let model = CooccurrenceModel::build(&corpus, 8).expect("failed to build model");
        let offset = model.offsets()[offset_ix];
        for anchor in 0..model.vocabulary_size() as u32 {
            for direction in [Direction::Forward, Direction::Backward] {
                for candidate in score_candidates(&model, anchor, offset, direction) {
                    prop_assert!(candidate.forward_prob > 0.0);
                    prop_assert!(candidate.backward_prob > 0.0);
                    prop_assert!(candidate.combined_score <= 1.0);
                }
            }
        }
    }
}
