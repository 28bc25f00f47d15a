//! Line commands for the terminal host.

use std::str::FromStr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::constants::SPIN_DURATION_OPTIONS;
use shared::validation::parse_price;
use shared::{format_price, GameStatus, ItemUpdate, NewItem, RouletteGame, RouletteItem, RouletteSettings, WeightMode};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::info;

use crate::animation::{run_spin, SpinFeedback, TerminalFeedback};
use crate::config::{parse_bool, AppConfig};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verb {
    Help,
    List,
    Add,
    Rename,
    Price,
    Color,
    Remove,
    Search,
    Mode,
    Elimination,
    Duration,
    Spin,
    #[strum(serialize = "ok", serialize = "ack")]
    Acknowledge,
    History,
    Sectors,
    Status,
    Export,
    Reset,
    #[strum(serialize = "quit", serialize = "exit")]
    Quit,
}

impl Verb {
    pub fn usage(&self) -> &'static str {
        match self {
            Verb::Help => "help                      show this list",
            Verb::List => "list                      items with weights and odds",
            Verb::Add => "add <price> <name>        add an item",
            Verb::Rename => "rename <item> <name>      change an item's name",
            Verb::Price => "price <item> <price>      change an item's price",
            Verb::Color => "color <item> <#rrggbb>    change an item's color",
            Verb::Remove => "remove <item>             remove an item",
            Verb::Search => "search <text>             filter by name or price",
            Verb::Mode => "mode [normal|reversed]    set or toggle weighting",
            Verb::Elimination => "elimination [on|off]      set or toggle elimination",
            Verb::Duration => "duration [<ms>|<label>]   set or list spin durations",
            Verb::Spin => "spin                      spin the wheel",
            Verb::Acknowledge => "ok                        acknowledge the result",
            Verb::History => "history                   last results, newest first",
            Verb::Sectors => "sectors                   wheel geometry",
            Verb::Status => "status                    game state",
            Verb::Export => "export                    dump state as JSON",
            Verb::Reset => "reset                     clear items and history",
            Verb::Quit => "quit                      leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    List,
    Add { price: Decimal, name: String },
    Rename { item: String, name: String },
    Price { item: String, price: Decimal },
    Color { item: String, color: String },
    Remove { item: String },
    Search { query: String },
    Mode(Option<WeightMode>),
    Elimination(Option<bool>),
    Duration(Option<Duration>),
    Spin,
    Acknowledge,
    History,
    Sectors,
    Status,
    Export,
    Reset,
    Quit,
}

fn split_first(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(value: &'a str, verb: Verb) -> Result<&'a str, AppError> {
    if value.is_empty() {
        return Err(AppError::usage(format!("usage: {}", verb.usage())));
    }
    Ok(value)
}

fn price_arg(value: &str) -> Result<Decimal, AppError> {
    parse_price(value).map_err(|err| {
        AppError::usage(
            err.message
                .map(|message| message.to_string())
                .unwrap_or_else(|| err.code.to_string()),
        )
    })
}

fn duration_arg(value: &str) -> Result<Duration, AppError> {
    if let Some(option) = SPIN_DURATION_OPTIONS
        .iter()
        .find(|option| option.label.eq_ignore_ascii_case(value))
    {
        return Ok(option.duration());
    }
    value
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| AppError::usage(format!("not a duration: {}", value)))
}

pub fn parse_command(line: &str) -> Result<Command, AppError> {
    let (verb, rest) = split_first(line);
    let verb = Verb::from_str(verb).map_err(|_| AppError::usage(format!("unknown command: {} (try help)", verb)))?;

    let command = match verb {
        Verb::Help => Command::Help,
        Verb::List => Command::List,
        Verb::Add => {
            let (price, name) = split_first(required(rest, verb)?);
            Command::Add {
                price: price_arg(price)?,
                name: required(name, verb)?.to_string(),
            }
        }
        Verb::Rename => {
            let (item, name) = split_first(required(rest, verb)?);
            Command::Rename {
                item: item.to_string(),
                name: required(name, verb)?.to_string(),
            }
        }
        Verb::Price => {
            let (item, price) = split_first(required(rest, verb)?);
            Command::Price {
                item: item.to_string(),
                price: price_arg(required(price, verb)?)?,
            }
        }
        Verb::Color => {
            let (item, color) = split_first(required(rest, verb)?);
            Command::Color {
                item: item.to_string(),
                color: required(color, verb)?.to_string(),
            }
        }
        Verb::Remove => Command::Remove {
            item: required(rest, verb)?.to_string(),
        },
        Verb::Search => Command::Search {
            query: rest.to_string(),
        },
        Verb::Mode if rest.is_empty() => Command::Mode(None),
        Verb::Mode => Command::Mode(Some(
            WeightMode::from_str(rest).map_err(|_| AppError::usage(format!("usage: {}", verb.usage())))?,
        )),
        Verb::Elimination if rest.is_empty() => Command::Elimination(None),
        Verb::Elimination => Command::Elimination(Some(
            parse_bool(rest).ok_or_else(|| AppError::usage(format!("usage: {}", verb.usage())))?,
        )),
        Verb::Duration if rest.is_empty() => Command::Duration(None),
        Verb::Duration => Command::Duration(Some(duration_arg(rest)?)),
        Verb::Spin => Command::Spin,
        Verb::Acknowledge => Command::Acknowledge,
        Verb::History => Command::History,
        Verb::Sectors => Command::Sectors,
        Verb::Status => Command::Status,
        Verb::Export => Command::Export,
        Verb::Reset => Command::Reset,
        Verb::Quit => Command::Quit,
    };
    Ok(command)
}

/// Resolves an item reference: 1-based list position, full id, or unique id
/// prefix. A number within the list length always means a position.
pub fn resolve_item(game: &RouletteGame, reference: &str) -> Result<String, AppError> {
    let items = game.items();
    if let Ok(position) = reference.parse::<usize>() {
        if (1..=items.len()).contains(&position) {
            return Ok(items[position - 1].id.clone());
        }
    }

    let mut matches = items.iter().filter(|item| item.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item.id.clone()),
        (Some(_), Some(_)) => Err(AppError::usage(format!("{} matches more than one item", reference))),
        (None, _) => Err(AppError::usage(format!("no item matches {}", reference))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    settings: &'a RouletteSettings,
    items: &'a [RouletteItem],
    history: &'a [RouletteItem],
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

pub struct App {
    game: RouletteGame,
    rng: StdRng,
    frame_interval: Duration,
    feedback: Box<dyn SpinFeedback + Send>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            game: RouletteGame::new(config.settings),
            rng,
            frame_interval: config.frame_interval,
            feedback: Box::new(TerminalFeedback),
        }
    }

    pub fn game(&self) -> &RouletteGame {
        &self.game
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, AppError> {
        match command {
            Command::Help => {
                for verb in Verb::iter() {
                    println!("  {}", verb.usage());
                }
                println!("  <item> is a list position, an id, or an id prefix");
            }
            Command::List => self.print_items(self.game.items().iter().collect()),
            Command::Add { price, name } => {
                let item = self.game.add_item(NewItem::new(name, price), &mut self.rng)?;
                println!("added {} [{}]", item.name, short_id(&item.id));
            }
            Command::Rename { item, name } => {
                let id = resolve_item(&self.game, &item)?;
                let update = ItemUpdate {
                    name: Some(name),
                    ..Default::default()
                };
                let item = self.game.update_item(&id, update)?;
                println!("renamed to {}", item.name);
            }
            Command::Price { item, price } => {
                let id = resolve_item(&self.game, &item)?;
                let update = ItemUpdate {
                    price: Some(price),
                    ..Default::default()
                };
                let item = self.game.update_item(&id, update)?;
                println!("{} now costs {}", item.name, format_price(item.price));
            }
            Command::Color { item, color } => {
                let id = resolve_item(&self.game, &item)?;
                let update = ItemUpdate {
                    color: Some(color),
                    ..Default::default()
                };
                let item = self.game.update_item(&id, update)?;
                println!("{} is now {}", item.name, item.color);
            }
            Command::Remove { item } => {
                let id = resolve_item(&self.game, &item)?;
                let removed = self.game.remove_item(&id)?;
                println!("removed {}", removed.name);
            }
            Command::Search { query } => {
                let found = self.game.search(&query);
                if found.is_empty() {
                    println!("nothing matches {:?}", query);
                } else {
                    self.print_items(found);
                }
            }
            Command::Mode(mode) => {
                let mode = match mode {
                    Some(mode) => {
                        self.game.set_weight_mode(mode);
                        mode
                    }
                    None => self.game.toggle_weight_mode(),
                };
                info!("weight mode set to {}", mode);
                println!("weight mode: {}", mode);
            }
            Command::Elimination(enabled) => {
                let enabled = match enabled {
                    Some(enabled) => {
                        self.game.set_elimination_mode(enabled);
                        enabled
                    }
                    None => self.game.toggle_elimination_mode(),
                };
                println!("elimination: {}", if enabled { "on" } else { "off" });
            }
            Command::Duration(None) => {
                let current = self.game.settings().spin_duration;
                for option in SPIN_DURATION_OPTIONS.iter() {
                    let marker = if option.duration() == current { "*" } else { " " };
                    println!(" {} {:>4} ({} ms)", marker, option.label, option.millis);
                }
            }
            Command::Duration(Some(duration)) => {
                self.game.set_spin_duration(duration);
                println!("spin duration: {} ms", duration.as_millis());
            }
            Command::Spin => {
                run_spin(&mut self.game, &mut self.rng, self.frame_interval, self.feedback.as_mut()).await?;
                if self.game.settings().elimination_mode {
                    println!("type ok to remove it from the wheel");
                } else {
                    println!("type ok to continue");
                }
            }
            Command::Acknowledge => {
                let selected = self.game.acknowledge()?;
                if self.game.settings().elimination_mode {
                    println!("{} left the wheel", selected.name);
                }
                self.print_status();
            }
            Command::History => {
                if self.game.history().is_empty() {
                    println!("no spins yet");
                }
                for (i, item) in self.game.history().iter().enumerate() {
                    println!("{:>3}. {} ({})", i + 1, item.name, format_price(item.price));
                }
            }
            Command::Sectors => {
                for sector in self.game.sectors() {
                    println!(
                        "{}  {:>8.3}° .. {:>8.3}°  {}",
                        short_id(&sector.item_id),
                        sector.start,
                        sector.end,
                        sector.color
                    );
                }
            }
            Command::Status => self.print_status(),
            Command::Export => {
                let snapshot = Snapshot {
                    settings: self.game.settings(),
                    items: self.game.items(),
                    history: self.game.history(),
                };
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Command::Reset => {
                self.game.reset();
                println!("wheel cleared");
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn print_items(&self, items: Vec<&RouletteItem>) {
        if items.is_empty() {
            println!("no items yet, add one with: add <price> <name>");
            return;
        }
        let sectors = self.game.sectors();
        let full_turn = Decimal::from(360);
        for item in items {
            let position = self.game.items().iter().position(|i| i.id == item.id).unwrap_or(0);
            let odds = sectors
                .get(position)
                .map(|sector| (sector.end - sector.start) * Decimal::from(100) / full_turn)
                .unwrap_or_default();
            println!(
                "{:>3}. [{}] {:<24} {:>12}  weight {:>7.2}  {:>6.2}%  {}",
                position + 1,
                short_id(&item.id),
                item.name,
                format_price(item.price),
                item.weight,
                odds,
                item.color
            );
        }
    }

    fn print_status(&self) {
        match self.game.status() {
            GameStatus::Empty => println!("the wheel is empty"),
            GameStatus::NeedsMoreItems => println!("add at least one more item to pick a winner"),
            GameStatus::Ready => println!("ready to spin ({} items)", self.game.items().len()),
            GameStatus::Spinning => println!("spinning..."),
            GameStatus::AwaitingAcknowledgement(item) => println!("result: {} (type ok)", item.name),
            GameStatus::Winner(item) => {
                println!("🏆 winner: {} ({})", item.name, format_price(item.price));
                println!("reset to play again");
            }
        }
    }
}
