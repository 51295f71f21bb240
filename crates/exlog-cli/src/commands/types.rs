use exlog_core::ExerciseType;

pub fn type_lines() -> Vec<String> {
    ExerciseType::ALL
        .iter()
        .map(|kind| {
            format!(
                "{:<4}  {:<28}  {}",
                kind.platform_code(),
                kind.as_str().to_lowercase(),
                kind.label()
            )
        })
        .collect()
}

pub fn run_types() {
    for line in type_lines() {
        println!("{line}");
    }
}
