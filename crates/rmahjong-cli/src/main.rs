//! rmahjong: 麻雀の成績帳（コマンドライン版）
//!
//! ```shell
//! rmahjong record 杉村=32000 三瓶=28000 福原=24000 松井=16000
//! rmahjong record 杉村=52000,dealt 三瓶=30000,y=1 福原=20000 松井=-2000,bust
//! rmahjong undo
//! rmahjong settle
//! rmahjong stats
//! ```

mod config;
mod entry;
mod output;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use rmahjong_score::io::write_all_to;
use rmahjong_score::{Committed, GameType, JsonFileStore, PlayerName, Scorebook, YakumanUnits};

use config::Config;
use output::{StatusView, print_json};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "rmahjong", author, version, about = "mahjong score book for 4-player / 3-player tables")]
struct Cli {
    /// Data directory (overrides the config file; default ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (TOML). Defaults to ./rmahjong.toml if present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show settings and round counts
    Status,
    /// Compute a round without recording it
    Preview {
        /// NAME=SCORE[,bust|,dealt][,y=N] for every player
        #[arg(required = true, allow_hyphen_values = true)]
        entries: Vec<String>,
    },
    /// Validate and record a round
    Record {
        /// NAME=SCORE[,bust|,dealt][,y=N] for every player
        #[arg(required = true, allow_hyphen_values = true)]
        entries: Vec<String>,
    },
    /// Undo the most recent unsettled round
    Undo,
    /// Fold the current session into the lifetime stats
    Settle,
    /// Lifetime stats table
    Stats,
    /// Current session table
    Session,
    /// Recorded rounds
    History {
        /// Show only the last N rounds
        #[arg(long)]
        last: Option<usize>,
    },
    /// Export lifetime stats as CSV (UTF-8 with BOM; `.gz` compresses)
    ExportCsv {
        /// Output path, `-` for stdout
        #[arg(long, short, default_value = "-")]
        output: PathBuf,
    },
    /// Write a full backup into the data directory
    Backup {
        /// Also copy the backup to this path (`.gz` compresses)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Manage the player pool
    #[command(subcommand)]
    Player(PlayerCommand),
    /// Zero every lifetime stat (session and history are kept)
    ResetStats,
    /// Delete all data and restore default settings
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Rate { rate: f64 },
    GameType { game_type: GameTypeArg },
    /// Active players in seat order
    Roster {
        #[arg(required = true)]
        players: Vec<String>,
    },
    /// Uma table in thousands of points, one value per rank
    Uma {
        game_type: GameTypeArg,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<i32>,
    },
    /// Yakuman bonus / penalty units in thousands of points
    Yakuman {
        #[arg(long)]
        bonus: u32,
        #[arg(long)]
        penalty: u32,
    },
}

#[derive(Subcommand, Debug)]
enum PlayerCommand {
    Add { name: String },
    Rename { old: String, new: String },
    /// Delete stats of players that are not seated and have no unsettled rounds
    Purge {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GameTypeArg {
    #[value(aliases = ["4", "yonma"])]
    Four,
    #[value(aliases = ["3", "sanma"])]
    Three,
}

impl From<GameTypeArg> for GameType {
    fn from(v: GameTypeArg) -> Self {
        match v {
            GameTypeArg::Four => GameType::FourPlayer,
            GameTypeArg::Three => GameType::ThreePlayer,
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn init_logger(level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logger(config.log_level(cli.debug));

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn player(name: &str) -> Result<PlayerName> {
    PlayerName::new(name).with_context(|| format!("invalid player name {name:?}"))
}

/// 保存に失敗しても変更はこの実行中のみ有効として続行する
fn report_save<T>(committed: &Committed<T>) {
    if let Some(e) = &committed.save_error {
        warn!("変更は保存されませんでした: {e}");
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let data_dir = config.data_dir(cli.data_dir.as_deref());
    let (mut book, load_warnings) = Scorebook::open(JsonFileStore::new(&data_dir));
    // 読めなかった文書は既定値で続行する
    for w in &load_warnings {
        eprintln!("Warning: {w}");
    }
    let json = cli.json;

    match &cli.command {
        Command::Status => {
            if json {
                print_json(&StatusView::of(book.state()))?;
            } else {
                output::print_status(book.state());
            }
        }
        Command::Preview { entries } => {
            let input = entry::parse_round(entries)?;
            let preview = book.preview(&input)?;
            if json {
                print_json(&preview)?;
            } else {
                output::print_preview(&preview);
            }
        }
        Command::Record { entries } => {
            let input = entry::parse_round(entries)?;
            let v = book.validate(&input);
            if !v.valid && !json {
                output::print_validation(&v);
            }
            let committed = book.record_round(input)?;
            report_save(&committed);
            if json {
                print_json(&committed.value)?;
            } else {
                output::print_record(&committed.value);
            }
        }
        Command::Undo => {
            let committed = book.undo_last_round()?;
            report_save(&committed);
            if json {
                print_json(&committed.value)?;
            } else {
                println!("直近のゲーム記録を取り消しました");
                output::print_record(&committed.value);
            }
        }
        Command::Settle => {
            let committed = book.settle_session()?;
            report_save(&committed);
            if json {
                print_json(&committed.value)?;
            } else {
                output::print_settlement(&committed.value);
            }
        }
        Command::Stats => {
            let rows = book.stats_table();
            if json {
                print_json(&rows)?;
            } else {
                output::print_stats_table(&rows);
            }
        }
        Command::Session => {
            let rows = book.session_table();
            if json {
                print_json(&rows)?;
            } else {
                output::print_session_table(&rows);
            }
        }
        Command::History { last } => {
            let history = book.state().history();
            let skip = last.map_or(0, |n| history.len().saturating_sub(n));
            if json {
                print_json(&history[skip..])?;
            } else {
                output::print_history(history, book.state().settled_rounds(), skip);
            }
        }
        Command::ExportCsv { output } => {
            let Some(csv) = book.export_stats_csv() else {
                bail!("no lifetime stats to export");
            };
            write_all_to(output, &csv).with_context(|| format!("failed to write {}", output.display()))?;
        }
        Command::Backup { output } => {
            let location = book.export_backup()?;
            if let Some(path) = output {
                let json = book.snapshot().to_json()?;
                write_all_to(path, json.as_bytes())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            println!("{location}");
        }
        Command::Settings(cmd) => run_settings(&mut book, cmd, json)?,
        Command::Player(cmd) => run_player(&mut book, cmd)?,
        Command::ResetStats => {
            report_save(&book.reset_lifetime_stats()?);
            println!("通算成績をリセットしました");
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all data without --yes");
            }
            report_save(&book.clear_all()?);
            println!("全データを削除しました");
        }
    }
    Ok(())
}

fn run_settings(book: &mut Scorebook<JsonFileStore>, cmd: &SettingsCommand, json: bool) -> Result<()> {
    let committed = match cmd {
        SettingsCommand::Show => None,
        SettingsCommand::Rate { rate } => Some(book.set_rate(*rate)?),
        SettingsCommand::GameType { game_type } => Some(book.set_game_type((*game_type).into())?),
        SettingsCommand::Roster { players } => {
            let roster = players.iter().map(|p| player(p)).collect::<Result<Vec<_>>>()?;
            Some(book.set_roster(roster)?)
        }
        SettingsCommand::Uma { game_type, values } => Some(book.set_uma((*game_type).into(), values)?),
        SettingsCommand::Yakuman { bonus, penalty } => Some(book.set_yakuman_units(YakumanUnits {
            bonus: *bonus,
            penalty: *penalty,
        })?),
    };
    if let Some(c) = &committed {
        report_save(c);
    }
    if json {
        print_json(&output::SettingsView::of(book.settings()))
    } else {
        output::print_settings(book.settings());
        Ok(())
    }
}

fn run_player(book: &mut Scorebook<JsonFileStore>, cmd: &PlayerCommand) -> Result<()> {
    match cmd {
        PlayerCommand::Add { name } => {
            report_save(&book.add_player(player(name)?)?);
            println!("{name} を追加しました");
        }
        PlayerCommand::Rename { old, new } => {
            report_save(&book.rename_player(&player(old)?, &player(new)?)?);
            println!("{old} を {new} に変更しました");
        }
        PlayerCommand::Purge { names } => {
            let names = names.iter().map(|n| player(n)).collect::<Result<Vec<_>>>()?;
            let committed = book.purge_players(&names)?;
            report_save(&committed);
            for p in &committed.value {
                println!("{p} の成績を削除しました");
            }
        }
    }
    Ok(())
}
