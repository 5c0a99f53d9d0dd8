//! End-to-end pipeline tests over small legal-document corpora.

use redactor::{
    EntityType, FileSink, LexiconTagger, MockTagger, Pipeline, PipelineConfig,
    PlaceholderAllocator, PlaceholderPolicy, Sink, TaggerErrorPolicy, TokenPrediction,
};

fn legal_roster_tagger() -> LexiconTagger {
    LexiconTagger::new(["陈平飞", "叶宏天", "李飞", "宋晶晶", "陈东复明", "李明"]).unwrap()
}

#[test]
fn test_end_to_end_legal_document() {
    let input = "陈平飞    公司员工\n叶宏天   广东明日律师事务所律师\n";
    let mut pipeline = Pipeline::new(legal_roster_tagger());
    let report = pipeline.run(input).unwrap();

    assert_eq!(report.text, "A某,公司员工\nB某,广东明日律师事务所律师\n");
    assert_eq!(
        report.mapping,
        vec![
            ("陈平飞".to_string(), "A某".to_string()),
            ("叶宏天".to_string(), "B某".to_string()),
        ]
    );

    // One group per unit, each with exactly one PERSON span.
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].spans_of(&EntityType::Person)[0].text, "陈平飞");
    assert_eq!(report.groups[1].spans_of(&EntityType::Person)[0].text, "叶宏天");
}

#[test]
fn test_full_roster_with_blank_and_plain_lines() {
    let input = "\
陈平飞    公司员工
叶宏天   广东明日律师事务所律师
李  飞   广东明日律师事务所律师
宋晶晶  广东明日律师事务所实习律师
陈东复明  广东明日律师事务所实习律师
李  明  广东明日律师事务所实习律师

以上为示例
";
    let mut pipeline = Pipeline::new(legal_roster_tagger());
    let report = pipeline.run(input).unwrap();

    let lines: Vec<&str> = report.text.lines().collect();
    assert_eq!(lines.len(), 7); // blank line skipped
    assert_eq!(lines[0], "A某,公司员工");
    assert_eq!(lines[2], "C某,广东明日律师事务所律师");
    assert_eq!(lines[6], "以上为示例");

    // Six distinct names, allocated in document order.
    let placeholders: Vec<&str> = report.mapping.iter().map(|(_, p)| p.as_str()).collect();
    assert_eq!(placeholders, vec!["A某", "B某", "C某", "D某", "E某", "F某"]);
}

#[test]
fn test_recurring_name_stable_across_units() {
    let input = "陈平飞    公司员工\n证人陈平飞再次到庭\n";
    let mut pipeline = Pipeline::new(legal_roster_tagger());
    let report = pipeline.run(input).unwrap();

    assert_eq!(report.text, "A某,公司员工\n证人A某再次到庭\n");
    assert_eq!(report.mapping.len(), 1);
}

#[test]
fn test_substring_names_do_not_corrupt_each_other() {
    // "李明" and "李飞" share a surname; add bare "李" to the lexicon so a
    // shorter key exists in the mapping alongside the longer ones.
    let tagger = LexiconTagger::new(["李", "李明"]).unwrap();
    let input = "李   到场\n李明和李飞在场\n";
    let mut pipeline = Pipeline::new(tagger);
    let report = pipeline.run(input).unwrap();

    // "李" was allocated first (A某); longest-first substitution keeps
    // "李明" → B某 intact instead of producing "A某明".
    assert_eq!(report.text, "A某,到场\nB某和A某飞在场\n");
}

#[test]
fn test_inactive_types_pass_through() {
    let tagger = LexiconTagger::with_label(["广东明日律师事务所"], "ORG").unwrap();
    let input = "叶宏天   广东明日律师事务所律师\n";
    let mut pipeline = Pipeline::new(tagger);
    let report = pipeline.run(input).unwrap();

    // ORG is recognized and grouped, but not pseudonymized by default.
    assert_eq!(report.text, "叶宏天,广东明日律师事务所律师\n");
    assert_eq!(
        report.groups[0].spans_of(&EntityType::Organization).len(),
        1
    );
    assert!(report.mapping.is_empty());
}

#[test]
fn test_org_redaction_opt_in() {
    let tagger = LexiconTagger::with_label(["广东明日律师事务所"], "ORG").unwrap();
    let policy = PlaceholderPolicy::default().with_marker(EntityType::Organization, "组织");
    let mut pipeline = Pipeline::new(tagger).with_policy(policy);
    let report = pipeline.run("叶宏天   广东明日律师事务所律师\n").unwrap();

    assert_eq!(report.text, "叶宏天,A组织律师\n");
}

#[test]
fn test_skip_policy_continues_after_tagger_failure() {
    let tagger = MockTagger::new("flaky")
        .with_predictions(
            "陈平飞",
            vec![
                TokenPrediction::new("B-PERSON", 0, 1, "陈").unwrap(),
                TokenPrediction::new("I-PERSON", 1, 2, "平").unwrap(),
                TokenPrediction::new("I-PERSON", 2, 3, "飞").unwrap(),
            ],
        )
        .with_failure("模型超时段落");
    let config = PipelineConfig {
        on_tagger_error: TaggerErrorPolicy::SkipUnit,
        ..PipelineConfig::default()
    };
    let mut pipeline = Pipeline::with_config(tagger, config);
    let report = pipeline.run("模型超时段落\n陈平飞\n").unwrap();

    assert_eq!(report.text, "模型超时段落\nA某\n");
    assert_eq!(report.skipped_units, vec![0]);
    assert!(report.groups[0].is_empty());
}

#[test]
fn test_sink_failure_leaves_results_intact() {
    let mut pipeline = Pipeline::new(legal_roster_tagger());
    let report = pipeline.run("陈平飞    公司员工\n").unwrap();

    // A file where the sink expects a directory forces a persist failure.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();
    let sink = FileSink::new(&blocker);

    assert!(sink.persist(&report.text, "redacted.txt").is_err());
    // In-memory results are untouched by the sink failure.
    assert_eq!(report.text, "A某,公司员工\n");
    assert_eq!(pipeline.allocator().get("陈平飞"), Some("A某"));
}

#[test]
fn test_persisted_output_round_trips() {
    let mut pipeline = Pipeline::new(legal_roster_tagger());
    let report = pipeline.run("陈平飞    公司员工\n").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new(dir.path());
    sink.persist(&report.text, "redacted.txt").unwrap();

    let written = std::fs::read_to_string(dir.path().join("redacted.txt")).unwrap();
    assert_eq!(written, report.text);
}

#[test]
fn test_seeded_allocator_keeps_placeholders_across_runs() {
    // First run allocates.
    let mut first = Pipeline::new(legal_roster_tagger());
    first.run("陈平飞    公司员工\n").unwrap();
    let json = serde_json::to_string(first.allocator()).unwrap();

    // Second run, seeded: "陈平飞" keeps A某, new names continue after it.
    let seeded: PlaceholderAllocator = serde_json::from_str(&json).unwrap();
    let mut second = Pipeline::new(legal_roster_tagger()).with_allocator(seeded);
    let report = second.run("叶宏天和陈平飞到庭\n").unwrap();

    assert_eq!(report.text, "B某和A某到庭\n");
}
