//! Line-oriented console over an [`Explorer`].
//!
//! Input lines and completions are handled in one loop, so commands such as
//! `cancel` are accepted while a search is still running.

use std::fmt::Write as _;

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::entry::DirectoryEntry;
use crate::explorer::search::SearchState;
use crate::explorer::{Action, Completions, Explorer, Update, ViewMode};
use crate::format::{format_size, result_count_label};
use crate::highlight::render_marked;
use crate::notify::{NotificationSink, Severity};

pub const HELP: &str = "\
comandos:
  connect | disconnect | status
  ls                  refrescar el directorio actual
  cd <ruta>           entrar en una carpeta (.., nombre o ruta absoluta)
  up | root           subir un nivel | ir a la raíz
  crumb <n>           saltar a la miga n (0 = Inicio)
  open <n>            abrir la fila n (carpeta: entrar, archivo: descargar)
  get <nombre|ruta>   descargar un archivo
  type <texto>        escribir en el buscador (sugerencias)
  pick <n>            elegir la sugerencia n
  search [texto]      búsqueda completa
  cancel | clear      cancelar | limpiar la búsqueda
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Actions(Vec<Action>),
    /// 1-based row in whatever list is on screen.
    Open(usize),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_start();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line.trim_end(), ""),
    };

    let one = |action: Action| Ok(Command::Actions(vec![action]));
    let number = |what: &str| -> Result<usize, String> {
        rest.parse::<usize>()
            .map_err(|_| format!("{what}: se esperaba un número"))
    };

    match word {
        "" | "status" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "connect" => one(Action::Connect),
        "disconnect" => one(Action::Disconnect),
        "ls" | "refresh" => one(Action::Refresh),
        "up" => one(Action::GoUp),
        "root" => one(Action::GoRoot),
        "cd" if rest.is_empty() => Err("cd: falta la ruta".to_string()),
        "cd" => one(Action::Navigate(rest.to_string())),
        "crumb" => one(Action::OpenCrumb(number("crumb")?)),
        "open" => match number("open")? {
            0 => Err("open: las filas empiezan en 1".to_string()),
            n => Ok(Command::Open(n)),
        },
        "get" if rest.is_empty() => Err("get: falta el archivo".to_string()),
        "get" => one(Action::Download(rest.to_string())),
        "type" => one(Action::QueryChanged(rest.to_string())),
        "pick" => match number("pick")? {
            0 => Err("pick: las sugerencias empiezan en 1".to_string()),
            n => one(Action::SelectSuggestion(n - 1)),
        },
        "search" if rest.is_empty() => one(Action::RunSearch),
        "search" => Ok(Command::Actions(vec![
            Action::QueryChanged(rest.to_string()),
            Action::RunSearch,
        ])),
        "cancel" => one(Action::CancelSearch),
        "clear" => one(Action::ClearSearch),
        other => Err(format!("comando desconocido: {other} (help)")),
    }
}

/// Maps a 1-based row to the action for the list currently shown.
pub fn open_row(explorer: &Explorer, row: usize) -> Action {
    let index = row.saturating_sub(1);
    match explorer.view_mode() {
        ViewMode::Results => Action::OpenResult(index),
        _ => Action::OpenEntry(index),
    }
}

pub fn render(explorer: &Explorer) -> String {
    let mut out = String::new();
    let nav = explorer.navigation();

    let status = if explorer.is_connected() {
        "conectado"
    } else if explorer.connection().is_connecting() {
        "conectando..."
    } else {
        "desconectado"
    };
    let _ = writeln!(out, "[{}] {}", status, nav.path());

    match explorer.view_mode() {
        ViewMode::Navigation => render_navigation(explorer, &mut out),
        ViewMode::Searching => {
            if let SearchState::Searching { query } = explorer.search().state() {
                let _ = writeln!(
                    out,
                    "Buscando \"{query}\" en todas las carpetas... puede tomar hasta 30 segundos ('cancel' para detener)"
                );
            }
        }
        ViewMode::Results => render_results(explorer, &mut out),
    }

    let suggestions = explorer.suggestions();
    if suggestions.is_visible() && explorer.view_mode() != ViewMode::Searching {
        let _ = writeln!(out, "sugerencias para \"{}\":", explorer.query().trim());
        for (i, s) in suggestions.suggestions().iter().enumerate() {
            let tag = if s.is_directory { "DIR" } else { "   " };
            let _ = writeln!(out, "  {:>2}) [{}] {}  {}", i + 1, tag, s.name, s.full_path);
        }
    }
    out
}

fn render_navigation(explorer: &Explorer, out: &mut String) {
    let nav = explorer.navigation();
    if !explorer.is_connected() && nav.entries().is_empty() {
        let _ = writeln!(out, "sin conexión ('connect' para empezar)");
        return;
    }

    let crumbs: Vec<String> = nav
        .breadcrumb()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if c.active {
                format!("{i}:[{}]", c.label)
            } else {
                format!("{i}:{}", c.label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", crumbs.join(" > "));

    if nav.is_loading() {
        let _ = writeln!(out, "cargando...");
    }
    if let Some(e) = nav.last_error() {
        let _ = writeln!(out, "! {e}");
    }
    if nav.entries().is_empty() && !nav.is_loading() {
        let _ = writeln!(out, "(carpeta vacía)");
    }
    for (i, entry) in nav.entries().iter().enumerate() {
        let _ = writeln!(out, "  {:>3}. {}", i + 1, entry_line(entry, &entry.name));
    }
}

fn render_results(explorer: &Explorer, out: &mut String) {
    let Some((query, outcome)) = explorer.search().results() else {
        return;
    };
    let _ = writeln!(out, "{}", result_count_label(outcome.results.len()));
    if outcome.results.is_empty() {
        let _ = writeln!(out, "No se encontraron resultados para \"{query}\"");
        return;
    }
    for (i, hit) in outcome.results.iter().enumerate() {
        let name = render_marked(&hit.entry.name, query, "[", "]");
        let _ = writeln!(out, "  {:>3}. {}", i + 1, entry_line(&hit.entry, &name));
        let _ = writeln!(out, "        {}", hit.full_path);
    }
}

fn entry_line(entry: &DirectoryEntry, display_name: &str) -> String {
    format!(
        "[{}] {}  {} • {}",
        entry.kind().tag(),
        display_name,
        format_size(entry.size_bytes, entry.is_directory),
        entry.modified_at
    )
}

fn redraws(update: Update) -> bool {
    matches!(
        update,
        Update::Connection | Update::Directory | Update::Suggestions | Update::Search
    )
}

/// Prints notices to stderr, apart from the view on stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        eprintln!("[{severity}] {message}");
    }
}

/// Runs until `quit` or end of input.
pub async fn run<R>(
    explorer: &mut Explorer,
    completions: &mut Completions,
    input: R,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("{}", render(explorer));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Show) => println!("{}", render(explorer)),
                    Ok(Command::Open(row)) => {
                        let action = open_row(explorer, row);
                        if redraws(explorer.dispatch(action)) {
                            println!("{}", render(explorer));
                        }
                    }
                    Ok(Command::Actions(actions)) => {
                        let mut redraw = false;
                        for action in actions {
                            redraw |= redraws(explorer.dispatch(action));
                        }
                        if redraw {
                            println!("{}", render(explorer));
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            Some(completion) = completions.recv() => {
                let update = explorer.apply(completion);
                debug!("applied completion: {:?}", update);
                if redraws(update) {
                    println!("{}", render(explorer));
                }
            }
        }
    }
    Ok(())
}
