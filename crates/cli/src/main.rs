use anyhow::{bail, Context};
use barter_autoplay::{
    write_json, write_text, AutoplayConfig, AutoplayResult, PlayerPolicy, Simulator,
};
use barter_core::{BarterConfig, Card, Event};
use barter_data::{load_config, load_npc_config};
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "assets/barter.json";

const USAGE: &str = "usage: barter-cli [--config PATH | --pack PATH --npc ID] [--seed N] \
[--policy greedy|random] [--tick SECONDS] [--think SECONDS] [--max-ticks N] \
[--events] [--json PATH] [--report PATH]";

#[derive(Debug)]
struct CliOptions {
    config: PathBuf,
    pack: Option<PathBuf>,
    npc: Option<String>,
    autoplay: AutoplayConfig,
    show_events: bool,
    json_out: Option<PathBuf>,
    report_out: Option<PathBuf>,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions {
        config: PathBuf::from(DEFAULT_CONFIG),
        pack: None,
        npc: None,
        autoplay: AutoplayConfig::default(),
        show_events: false,
        json_out: None,
        report_out: None,
    };
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "--config" | "-c" => options.config = PathBuf::from(take_value(args, &mut idx, flag)?),
            "--pack" => options.pack = Some(PathBuf::from(take_value(args, &mut idx, flag)?)),
            "--npc" => options.npc = Some(take_value(args, &mut idx, flag)?.to_string()),
            "--seed" => {
                options.autoplay.seed = take_value(args, &mut idx, flag)?
                    .parse()
                    .context("--seed expects an integer")?;
            }
            "--policy" => {
                options.autoplay.policy = take_value(args, &mut idx, flag)?
                    .parse::<PlayerPolicy>()
                    .map_err(anyhow::Error::msg)?;
            }
            "--tick" => {
                options.autoplay.tick_seconds = take_value(args, &mut idx, flag)?
                    .parse()
                    .context("--tick expects seconds")?;
            }
            "--think" => {
                options.autoplay.think_seconds = take_value(args, &mut idx, flag)?
                    .parse()
                    .context("--think expects seconds")?;
            }
            "--max-ticks" => {
                options.autoplay.max_ticks = take_value(args, &mut idx, flag)?
                    .parse()
                    .context("--max-ticks expects an integer")?;
            }
            "--events" => options.show_events = true,
            "--json" => options.json_out = Some(PathBuf::from(take_value(args, &mut idx, flag)?)),
            "--report" => {
                options.report_out = Some(PathBuf::from(take_value(args, &mut idx, flag)?));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
        idx += 1;
    }
    if options.pack.is_some() != options.npc.is_some() {
        bail!("--pack and --npc go together\n{USAGE}");
    }
    Ok(options)
}

fn take_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .with_context(|| format!("{flag} needs a value"))
}

fn load_barter(options: &CliOptions) -> anyhow::Result<BarterConfig> {
    match (&options.pack, &options.npc) {
        (Some(pack), Some(npc)) => load_npc_config(pack, npc),
        _ => load_config(&options.config),
    }
}

fn card_list(cards: &[Card]) -> String {
    cards.iter().map(Card::id).collect::<Vec<_>>().join(" ")
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::HandUpdated { participant, delta } => {
            if delta.is_reorder() {
                return format!("{} hand reordered", participant.label());
            }
            let added: Vec<Card> = delta.added.iter().map(|item| item.card.clone()).collect();
            let removed: Vec<Card> = delta.removed.iter().map(|item| item.card.clone()).collect();
            format!(
                "{} hand +[{}] from {} -[{}] to {}",
                participant.label(),
                card_list(&added),
                delta.add_source.label(),
                card_list(&removed),
                delta.removed_destination.label()
            )
        }
        Event::Drew { participant, count } => format!("{} drew {count}", participant.label()),
        Event::Shuffled { participant } => {
            format!("{} shuffled discard into draw", participant.label())
        }
        Event::OppCardsSet(Some(cards)) => format!("opponent plays [{}]", card_list(cards)),
        Event::OppCardsSet(None) => "opponent cards cleared".to_string(),
        Event::PlayerCardsSet(slots) => {
            let shown: Vec<&str> = slots
                .iter()
                .map(|slot| slot.as_ref().map_or("_", Card::id))
                .collect();
            format!("player slots [{}]", shown.join(" "))
        }
        Event::PlayerAllCardsSet => "player slots full".to_string(),
        Event::MatchArraySet(Some(outcomes)) => format!(
            "outcomes {}",
            outcomes.iter().map(|outcome| outcome.symbol()).collect::<String>()
        ),
        Event::MatchArraySet(None) => "outcomes cleared".to_string(),
        Event::StateChanged { from, to } => format!(
            "state {} -> {}",
            from.map_or("-", |state| state.name()),
            to.name()
        ),
        Event::Won => "WON".to_string(),
        Event::Lost => "LOST".to_string(),
    }
}

fn print_summary(result: &AutoplayResult, show_events: bool) {
    if show_events {
        for event in &result.events {
            println!("{}", describe_event(event));
        }
        println!();
    }
    println!("{}", result.to_text_report());
}

fn write_outputs(options: &CliOptions, result: &AutoplayResult) -> anyhow::Result<()> {
    if let Some(path) = &options.json_out {
        write_json(path, result).with_context(|| format!("write {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = &options.report_out {
        write_text(path, result).with_context(|| format!("write {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let barter = load_barter(&options)?;
    log::info!(
        "negotiating against {:?} with seed {} ({} policy)",
        barter.matrix.id,
        options.autoplay.seed,
        options.autoplay.policy.label()
    );
    let result = Simulator::from_config(&barter, options.autoplay.clone())?.run()?;
    print_summary(&result, options.show_events);
    write_outputs(&options, &result)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = parse_cli_options(&args).and_then(run);
    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barter_core::{Participant, TurnState};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn defaults_to_the_sample_config() {
        let options = parse_cli_options(&[]).expect("parse");
        assert_eq!(options.config, PathBuf::from(DEFAULT_CONFIG));
        assert_eq!(options.autoplay.policy, PlayerPolicy::Greedy);
        assert!(!options.show_events);
    }

    #[test]
    fn reads_flags() {
        let options = parse_cli_options(&args(&[
            "--pack", "traders.json", "--npc", "tinker", "--seed", "9", "--policy", "random",
            "--tick", "0.25", "--events",
        ]))
        .expect("parse");
        assert_eq!(options.pack, Some(PathBuf::from("traders.json")));
        assert_eq!(options.npc.as_deref(), Some("tinker"));
        assert_eq!(options.autoplay.seed, 9);
        assert_eq!(options.autoplay.policy, PlayerPolicy::Random);
        assert_eq!(options.autoplay.tick_seconds, 0.25);
        assert!(options.show_events);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_cli_options(&args(&["--seed"])).is_err());
        assert!(parse_cli_options(&args(&["--seed", "soon"])).is_err());
        assert!(parse_cli_options(&args(&["--pack", "traders.json"])).is_err());
        assert!(parse_cli_options(&args(&["--dance"])).is_err());
    }

    #[test]
    fn events_read_as_one_liners() {
        assert_eq!(
            describe_event(&Event::StateChanged {
                from: None,
                to: TurnState::Init
            }),
            "state - -> Init"
        );
        assert_eq!(
            describe_event(&Event::Drew {
                participant: Participant::Player,
                count: 3
            }),
            "player drew 3"
        );
        assert_eq!(
            describe_event(&Event::PlayerCardsSet(vec![Some(Card::new("bluff")), None])),
            "player slots [bluff _]"
        );
    }
}
