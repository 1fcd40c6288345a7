use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use rustedbytes_explorer::config::{
    DEFAULT_MAX_RESULTS, DEFAULT_MIN_QUERY_LEN, ExplorerConfig,
};

/// Configurazione da linea di comando
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// URL base del servizio remoto dei file
    #[arg(
        short,
        long,
        default_value = "http://127.0.0.1:5000/modulos/consolidador-t25/"
    )]
    pub url: String,

    /// Username inviato alla connessione (se assente usa quello del servizio)
    #[arg(long)]
    pub username: Option<String>,

    /// Password inviata alla connessione
    #[arg(long, env = "EXPLORER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Pausa dopo la digitazione prima di chiedere i suggerimenti (ms)
    #[arg(long, default_value = "300")]
    pub debounce_ms: u64,

    /// Lunghezza minima della query per suggerimenti e ricerca
    #[arg(long, default_value_t = DEFAULT_MIN_QUERY_LEN)]
    pub min_query_len: usize,

    /// Numero massimo di risultati richiesti alla ricerca
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: u32,

    /// Timeout di connessione TCP verso il servizio (s)
    #[arg(long, default_value = "30")]
    pub connect_timeout: u64,

    /// Directory in cui salvare i file scaricati
    #[arg(long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Connettersi subito all'avvio della console
    #[arg(long)]
    pub connect: bool,

    /// Livello di log (RUST_LOG ha la precedenza)
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn explorer_config(&self) -> ExplorerConfig {
        ExplorerConfig {
            base_url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_len: self.min_query_len.max(1),
            max_results: self.max_results,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            download_dir: self.download_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_is_validated_at_parse_time() {
        let args = Args::try_parse_from(["rustedbytes-explorer", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level, LevelFilter::Debug);
        assert!(Args::try_parse_from(["rustedbytes-explorer", "--log-level", "rumoroso"]).is_err());
    }

    #[test]
    fn min_query_len_never_drops_below_one() {
        let args = Args::try_parse_from(["rustedbytes-explorer", "--min-query-len", "0"]).unwrap();
        assert_eq!(args.explorer_config().min_query_len, 1);
    }
}
