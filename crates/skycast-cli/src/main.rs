mod command;
mod errors;
mod render;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use skycast_core::Config;
use skycast_weather::storage::{load_history, load_unit, save_unit};
use skycast_weather::{
    Debouncer, FetchController, FetchMessage, FetchState, FileStore, KeyValueStore,
    ProviderSettings, RequestOutcome, TemperatureUnit, WeatherProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use command::{Command, HELP};
use errors::FailureHints;

type Controller = FetchController<WeatherProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init("warn")?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            let err = errors::classify_config(&e);
            tracing::warn!("Falling back to default configuration: {}", err);
            eprintln!("{}", err.user_message());
            Config::default_with_env()
        }
    };
    if !config.weather.has_api_key() {
        eprintln!(
            "No weather API key configured. Set {} or weather.api_key in the config file.",
            skycast_core::config::API_KEY_ENV
        );
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.config_dir.clone()));
    let history = load_history(store.as_ref());
    let unit = load_unit(store.as_ref());

    let provider = WeatherProvider::new(ProviderSettings {
        api_key: config.weather.api_key.clone(),
        base_url: config.weather.base_url.clone(),
        forecast_days: config.weather.forecast_days,
        timeout: std::time::Duration::from_secs(config.weather.request_timeout_secs),
    })?;

    let (controller, completions) = FetchController::new(Arc::new(provider), history, Handle::current());
    let mut controller = controller
        .with_store(Arc::clone(&store))
        .with_default_city(config.weather.default_city.clone());

    let (state_tx, states) = mpsc::unbounded_channel();
    controller.subscribe(move |state: &FetchState| {
        let _ = state_tx.send(state.clone());
    });

    let (debouncer, searches) = Debouncer::spawn(config.search.debounce(), &Handle::current());

    println!("SkyCast - type a city name, or :help for commands.");
    tracing::info!(
        "Started with {} saved searches, unit {}",
        controller.history().len(),
        unit.as_str()
    );

    let mut session = Session {
        controller,
        store,
        unit,
        failure_hints: FailureHints::default(),
    };

    if session.controller.history().is_empty() {
        session.controller.reset_to_default();
    } else {
        session.controller.replay_latest();
    }

    let result = session.run(debouncer, searches, completions, states).await;
    tracing::info!("SkyCast shutting down");
    result
}

struct Session {
    controller: Controller,
    store: Arc<dyn KeyValueStore>,
    unit: TemperatureUnit,
    failure_hints: FailureHints,
}

impl Session {
    async fn run(
        &mut self,
        mut debouncer: Debouncer<String>,
        mut searches: mpsc::UnboundedReceiver<String>,
        mut completions: mpsc::UnboundedReceiver<FetchMessage>,
        mut states: mpsc::UnboundedReceiver<FetchState>,
    ) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(Command::Search(city)) => debouncer.trigger(city),
                        Ok(command) => self.execute(command)?,
                        Err(e) => println!("{}", e),
                    }
                }
                Some(city) = searches.recv() => {
                    self.controller.request(&city);
                }
                Some(message) = completions.recv() => {
                    // Stale completions are dropped by the controller and get no hint
                    let hint = errors::classify_message(&message);
                    if self.controller.apply(message) {
                        self.failure_hints.record(hint);
                    }
                }
                Some(state) = states.recv() => {
                    self.show(&state)?;
                }
            }
        }

        debouncer.shutdown();
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        match command {
            Command::History => render::history(&mut stdout, self.controller.history(), self.unit)?,
            Command::Open(n) => {
                let city = self
                    .controller
                    .history()
                    .get(n - 1)
                    .map(|entry| entry.city.clone());
                match city {
                    Some(city) => {
                        self.controller.request(&city);
                    }
                    None => writeln!(stdout, "No recent search #{}.", n)?,
                }
            }
            Command::Remove(id) => {
                if self.controller.remove_history(id) {
                    writeln!(stdout, "Removed.")?;
                } else {
                    writeln!(stdout, "No recent search with id {}.", id)?;
                }
            }
            Command::Clear => {
                self.controller.clear_history();
                writeln!(stdout, "Recent searches cleared.")?;
            }
            Command::ToggleUnit => {
                self.unit = self.unit.toggled();
                if let Err(e) = save_unit(self.store.as_ref(), self.unit) {
                    let err = errors::classify_storage(e);
                    tracing::warn!("Failed to save temperature unit: {}", err);
                    writeln!(stdout, "{}", err.user_message())?;
                }
                writeln!(stdout, "Showing temperatures in °{}.", self.unit.symbol())?;
                if let FetchState::Succeeded(result) = self.controller.state() {
                    render::forecast(&mut stdout, result, self.unit)?;
                }
            }
            Command::Retry => {
                if self.controller.retry() == RequestOutcome::Ignored {
                    writeln!(stdout, "Nothing to retry yet.")?;
                }
            }
            Command::Refresh => {
                let city = self.controller.last_city().map(str::to_string);
                match city {
                    Some(city) => {
                        self.controller.refresh(&city);
                    }
                    None => writeln!(stdout, "Nothing to refresh yet.")?,
                }
            }
            Command::Default => {
                self.controller.reset_to_default();
            }
            Command::Last => {
                if self.controller.replay_latest() == RequestOutcome::Ignored {
                    writeln!(stdout, "No recent searches.")?;
                }
            }
            Command::Help => writeln!(stdout, "{}", HELP)?,
            Command::Search(_) | Command::Quit | Command::Empty => {}
        }
        stdout.flush()?;
        Ok(())
    }

    fn show(&mut self, state: &FetchState) -> Result<()> {
        let hint = self.failure_hints.take_for(state);
        let mut stdout = std::io::stdout().lock();
        render::state(&mut stdout, state, self.unit, hint)?;
        stdout.flush()?;
        Ok(())
    }
}
