use idguard_core::{analyze, convert, sort_for_application, Format};

fn main() {
    let survey = r#"{
  "questions": [
    { "id": 1, "label": "Name" },
    { "id": 2, "label": "Email" },
    { "id": 1, "label": "Phone" }
  ]
}"#;

    let analysis = analyze(survey, None);
    for duplicate in &analysis.duplicates {
        eprintln!("{:?}", miette::Report::new(duplicate.to_diagnostic(survey, "survey.json")));
    }

    let mut fixes = analysis.fixes.clone();
    sort_for_application(&mut fixes);
    for fix in &fixes {
        println!(
            "line {}, columns {}..{}: replace with {}",
            fix.range.start_line,
            fix.range.start_column,
            fix.range.end_column,
            fix.replacement_text(analysis.format)
        );
    }

    match convert(survey, Format::Json, Format::Xml) {
        Ok(xml) => println!("As XML:\n{xml}"),
        Err(e) => eprintln!("Failed to convert: {e:?}"),
    }
}
