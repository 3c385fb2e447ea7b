//! Définition des arguments de la ligne de commande.

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use g4it_inventory::domain::{ColumnMapping, MappingKey};
use g4it_inventory::logging::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "g4it-inventory",
    version,
    about = "Validation et réparation des inventaires d'équipements G4IT (CSV / XLSX)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Fichier de configuration JSON (défaut: répertoire de configuration utilisateur)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosité des logs (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Format des logs
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Langue des messages (fr, en, zh-CN)
    #[arg(long = "locale", global = true)]
    pub locale: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Affiche les colonnes attendues
    Schema,

    /// Affiche la configuration effective
    Config,

    /// Vérifie qu'un fichier est lisible (extension, contenu)
    Check(FileArg),

    /// Vérifie les en-têtes obligatoires
    Headers(FileArg),

    /// Valide un inventaire complet
    Validate(FileArg),

    /// Détecte les dates jour/mois inversées
    CheckDates(DateArgs),

    /// Corrige les dates jour/mois inversées
    FixDates(FixDatesArgs),

    /// Renomme les colonnes selon un mapping
    Map(MapArgs),

    /// Regroupe les équipements identiques
    Consolidate(ConsolidateArgs),

    /// Exécute la chaîne complète (mapping, validation, dates, normalisation, regroupement)
    Run(RunArgs),

    /// Exporte au format {base}_NumEcoEval_{date}.csv
    Export(ExportArgs),
}

#[derive(Args)]
pub struct FileArg {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DateArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Colonne de date à analyser
    #[arg(long = "column", default_value = "dateAchat")]
    pub column: String,
}

#[derive(Args)]
pub struct FixDatesArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long = "column", default_value = "dateAchat")]
    pub column: String,

    /// Fichier de sortie (défaut: écrase le fichier d'entrée)
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct MapArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Entrée de mapping "source=cible" (répétable); une source numérique désigne une position
    #[arg(long = "map", value_name = "SOURCE=CIBLE", value_parser = parse_mapping_pair, required = true)]
    pub map: Vec<(MappingKey, String)>,

    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ConsolidateArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Champs de regroupement (séparés par des virgules; défaut: configuration)
    #[arg(long = "group-by", value_delimiter = ',')]
    pub group_by: Vec<String>,

    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long = "map", value_name = "SOURCE=CIBLE", value_parser = parse_mapping_pair)]
    pub map: Vec<(MappingKey, String)>,

    /// Colonnes de date à corriger (défaut: configuration)
    #[arg(long = "date-column")]
    pub date_columns: Vec<String>,

    /// Désactive la normalisation statut/type
    #[arg(long = "no-standardize")]
    pub no_standardize: bool,

    /// Active le regroupement
    #[arg(long = "consolidate")]
    pub consolidate: bool,

    #[arg(long = "group-by", value_delimiter = ',')]
    pub group_by: Vec<String>,

    /// Arrête après la validation si l'inventaire est invalide
    #[arg(long = "stop-on-invalid")]
    pub stop_on_invalid: bool,

    /// Fichier de sortie de la table traitée
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Fichier de sortie de la table regroupée
    #[arg(long = "consolidated-output", value_name = "PATH")]
    pub consolidated_output: Option<PathBuf>,
}

impl RunArgs {
    pub fn mapping(&self) -> Option<ColumnMapping> {
        if self.map.is_empty() {
            None
        } else {
            Some(self.map.iter().cloned().collect())
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Nom de base (défaut: nom du fichier d'entrée)
    #[arg(long = "base")]
    pub base: Option<String>,

    /// Date du nom de fichier (AAAA-MM-JJ, défaut: aujourd'hui)
    #[arg(long = "date", value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

/// Choix du format de logs
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn parse_mapping_pair(raw: &str) -> Result<(MappingKey, String), String> {
    ColumnMapping::parse_pair(raw)
        .ok_or_else(|| format!("mapping invalide '{}': attendu SOURCE=CIBLE", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("date invalide '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_mapping() {
        let cli = Cli::try_parse_from([
            "g4it-inventory",
            "run",
            "inv.csv",
            "--map",
            "Type=type",
            "--map",
            "0=nomEquipementPhysique",
            "--group-by",
            "type,modele",
            "--consolidate",
        ])
        .unwrap();

        match cli.command {
            Command::Run(args) => {
                let mapping = args.mapping().unwrap();
                assert_eq!(mapping.len(), 2);
                assert_eq!(args.group_by, vec!["type", "modele"]);
                assert!(args.consolidate);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_invalid_mapping_pair_is_rejected() {
        let result = Cli::try_parse_from(["g4it-inventory", "map", "a.csv", "--map", "Type", "-o", "b.csv"]);
        assert!(result.is_err());
    }
}
