use crate::prelude::*;
use std::sync::Arc;

pub const DUMP_USAGE: &str = "usage: beatmap-dump <file.osu>... [--settings settings.json] [--json]";

// entry point for this command
/// returns how many files failed to load
pub async fn beatmap_dump_cli(args: &mut impl Iterator<Item = String>) -> TatakuResult<usize> {
    let args = DumpArgs::from_args(args);
    if args.files.is_empty() {
        return Err(TatakuError::String(DUMP_USAGE.to_owned()));
    }

    let settings = Arc::new(args.settings.as_ref().map(ParserSettings::load).unwrap_or_default());
    info!("loading {} beatmap(s)", args.files.len());

    // each file gets its own blocking task, they share nothing but the settings
    let tasks = args.files
        .into_iter()
        .map(|file| {
            let settings = settings.clone();
            let path = file.clone();
            (file, tokio::task::spawn_blocking(move || Beatmap::load(path, &settings)))
        })
        .collect::<Vec<_>>();

    let mut failed = 0;
    for (file, task) in tasks {
        match task.await {
            Ok(Ok(parsed)) if args.json => println!("{}", serde_json::to_string_pretty(&parsed)?),
            Ok(Ok(parsed)) => println!("{}", summarize(&file, &parsed)),
            Ok(Err(e)) => {
                error!("error loading '{file}': {e}");
                failed += 1;
            }
            Err(e) => {
                error!("loader for '{file}' panicked: {e}");
                failed += 1;
            }
        }
    }

    Ok(failed)
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct DumpArgs {
    pub files: Vec<String>,
    pub settings: Option<String>,
    pub json: bool,
}
impl DumpArgs {
    pub fn from_args(args: &mut impl Iterator<Item = String>) -> Self {
        let mut data = Self::default();

        while let Some(arg) = args.next() {
            match &*arg {
                "--settings" => data.settings = args.next(),
                "--json" => data.json = true,
                other if other.starts_with("--") => warn!("unknown argument '{other}'"),
                _ => data.files.push(arg),
            }
        }

        data
    }
}


/// human readable overview of a loaded map
pub fn summarize(file: &str, parsed: &ParsedBeatmap) -> String {
    let map = &parsed.beatmap;
    let meta = map.metadata();
    let diff = map.difficulty();

    let (mut circles, mut sliders, mut spinners) = (0, 0, 0);
    for o in map.hit_objects() {
        match o {
            HitObject::Circle(_) => circles += 1,
            HitObject::Slider(_) => sliders += 1,
            HitObject::Spinner(_) => spinners += 1,
        }
    }

    let window = |j: u16| diff.hit_window(j).unwrap_or_default();

    let mut lines = vec![
        file.to_owned(),
        format!("  {} (mapped by {})", meta.version_string(), meta.creator),
        format!("  hash {}, format v{}, mode {:?}", meta.beatmap_hash, meta.format_version, meta.mode),
        format!("  {circles} circles, {sliders} sliders, {spinners} spinners, {} timing points, {} breaks", map.timing_points().len(), map.breaks().len()),
        format!("  length {}:{:02}, bpm {:.0}-{:.0}", meta.mins(1.0), meta.secs(1.0), meta.bpm_min, meta.bpm_max),
        format!("  cs {} ar {} od {} hp {}", diff.circle_size, diff.approach_rate, diff.overall_difficulty, diff.hp_drain),
        format!("  approach {}ms, circle {:.1}px, windows 300:{} 100:{} 50:{}", diff.approach_time(), diff.circle_diameter(), window(300), window(100), window(50)),
    ];

    if !parsed.is_clean() {
        lines.push(format!("  {} diagnostic(s):", parsed.diagnostics.len()));
        lines.extend(parsed.diagnostics.iter().map(|d| format!("    {d}")));
    }

    lines.join("\n")
}


#[allow(unused)]
mod beatmap_dump_tests {
    use crate::prelude::*;

    fn args(list: &[&str]) -> DumpArgs {
        DumpArgs::from_args(&mut list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parse_args() {
        let a = args(&["a.osu", "--json", "b.osu", "--settings", "s.json", "--what"]);
        assert_eq!(a.files, vec!["a.osu", "b.osu"]);
        assert_eq!(a.settings.as_deref(), Some("s.json"));
        assert!(a.json);

        assert_eq!(args(&[]), DumpArgs::default());
    }

    #[test]
    fn summary_lists_diagnostics() {
        let parsed = Beatmap::parse("osu file format v3\n[Metadata]\nTitle:t\nArtist:a\nVersion:v\n[HitObjects]\n0,0,0,1,0\n0,0,100,2,0,L|100:0,1,100").unwrap();
        let summary = summarize("test.osu", &parsed);

        assert!(summary.starts_with("test.osu\n"));
        assert!(summary.contains("a - t [v]"));
        assert!(summary.contains("1 circles, 1 sliders, 0 spinners"));
        assert!(summary.contains("1 diagnostic(s)"));
    }

    #[test]
    fn no_files_is_an_error() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = runtime.block_on(beatmap_dump_cli(&mut std::iter::empty::<String>()));
        assert!(matches!(result, Err(TatakuError::String(_))));
    }

    #[test]
    fn missing_files_are_counted() {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
        let mut args = ["does/not/exist.osu".to_owned()].into_iter();
        assert_eq!(runtime.block_on(beatmap_dump_cli(&mut args)).unwrap(), 1);
    }
}
