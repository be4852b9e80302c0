#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use permanence::{
    changelog::{ChangeRenderer, TextChangeLog},
    config::Settings,
    io::{self, ExportFormat},
    model::{AssignmentId, MemberId, Term},
    scheduler::{AssignmentInput, Finding, GenerationRequest, RosterError, Severity},
    service::RosterService,
    storage::{JsonStorage, Storage},
};
use std::fs::File;
use std::io::BufWriter;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI des permanences du comité bibliothèque (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de roster
    #[arg(long, global = true, env = "PERMANENCE_ROSTER", default_value = "roster.json")]
    roster: String,

    /// Réglages JSON (calendrier, niveaux éligibles, seuil d'équilibre)
    #[arg(long, global = true, env = "PERMANENCE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}

fn parse_term(s: &str) -> Result<Term, String> {
    s.parse()
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Écrire un fichier de réglages par défaut
    InitConfig {
        #[arg(long)]
        out: String,
    },

    /// Importer des membres depuis un CSV (`id,name,grade,class[,role]`)
    ImportMembers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des salles depuis un CSV (`id,name,capacity`)
    ImportRooms {
        #[arg(long)]
        csv: String,
    },

    /// Générer le planning d'un ou des trimestres couverts par la période
    Generate {
        #[arg(long, value_parser = parse_term)]
        term: Option<Term>,
        /// liste ordonnée "id1,id2,..." (défaut : niveaux éligibles)
        #[arg(long)]
        members: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        /// CSV `member_id,date[,reason]`
        #[arg(long)]
        exclusions: Option<String>,
        /// Remplacer les permanences existantes du trimestre
        #[arg(long)]
        force: bool,
    },

    /// Vérifier un trimestre avant publication
    Verify {
        #[arg(long, value_parser = parse_term)]
        term: Term,
        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Modifier une permanence (membre, salle, jour et trimestre revalidés ensemble)
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        member: u64,
        #[arg(long)]
        room: u64,
        /// 1 = lundi ... 5 = vendredi
        #[arg(long)]
        weekday: u8,
        #[arg(long)]
        term: String,
    },

    /// Ajouter une permanence
    Add {
        #[arg(long)]
        member: u64,
        #[arg(long)]
        room: u64,
        #[arg(long)]
        weekday: u8,
        #[arg(long)]
        term: String,
    },

    /// Supprimer une permanence
    Delete {
        #[arg(long)]
        id: u64,
    },

    /// Publier un trimestre (refusé tant qu'une erreur subsiste)
    Publish {
        #[arg(long, value_parser = parse_term)]
        term: Term,
    },

    /// Exporter le planning
    Export {
        #[arg(long, value_parser = parse_term)]
        term: Option<Term>,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Fichier de sortie (défaut : stdout)
        #[arg(long)]
        out: Option<String>,
    },

    /// Lister les permanences
    List {
        #[arg(long, value_parser = parse_term)]
        term: Option<Term>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)?,
        None => {
            let settings = Settings::for_date(Utc::now().date_naive())?;
            // calendrier déduit de l'horloge : on le rend visible
            eprintln!(
                "note: no --config given, academic year inferred from today: {} .. {}",
                settings.calendar.first.start, settings.calendar.second.end
            );
            settings
        }
    };
    let service = RosterService::new(JsonStorage::open(&cli.roster)?, settings);

    let code = match run(&service, cli.cmd) {
        Ok(code) => code,
        Err(err) => match err.downcast::<RosterError>() {
            Ok(domain) => report(&domain),
            Err(other) => return Err(other),
        },
    };

    std::process::exit(code);
}

fn run(service: &RosterService<JsonStorage>, cmd: Commands) -> Result<i32> {
    let code = match cmd {
        Commands::InitConfig { out } => {
            service.settings().save_to_file(&out)?;
            println!("settings written to {out}");
            0
        }
        Commands::ImportMembers { csv } => {
            let members = io::import_members_csv(&csv).with_context(|| format!("importing {csv}"))?;
            let n = service.import_members(members)?;
            println!("{n} member(s) imported");
            0
        }
        Commands::ImportRooms { csv } => {
            let rooms = io::import_rooms_csv(&csv).with_context(|| format!("importing {csv}"))?;
            let n = service.import_rooms(rooms)?;
            println!("{n} room(s) imported");
            0
        }
        Commands::Generate {
            term,
            members,
            start,
            end,
            exclusions,
            force,
        } => {
            let members = match members {
                Some(list) => parse_member_list(&list)?,
                None => Vec::new(),
            };
            let exclusions = match exclusions {
                Some(path) => io::import_exclusions_csv(&path)
                    .with_context(|| format!("importing {path}"))?,
                None => Vec::new(),
            };
            let request = GenerationRequest {
                term,
                members,
                start,
                end,
                exclusions,
                force_regenerate: force,
            };
            let outcome = service.generate(&request)?;
            println!("{} assignment(s) created", outcome.assignments_created);
            for gap in &outcome.gaps {
                println!("gap: {gap} ({:?})", gap.reason);
            }
            // Code 2 = WARNING/INCOMPLETE
            if outcome.gaps.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Verify { term, json } => {
            let findings = service.verify(term)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&findings)?);
            } else {
                print_findings(&findings);
            }
            severity_code(&findings)
        }
        Commands::Update {
            id,
            member,
            room,
            weekday,
            term,
        } => {
            let input = AssignmentInput {
                member,
                room,
                weekday,
                term,
            };
            let updated = service.update_assignment(AssignmentId::new(id), &input)?;
            let roster = service.storage().load()?;
            println!("{}", TextChangeLog.render(&roster, &updated));
            0
        }
        Commands::Add {
            member,
            room,
            weekday,
            term,
        } => {
            let input = AssignmentInput {
                member,
                room,
                weekday,
                term,
            };
            let added = service.add_assignment(&input)?;
            println!("assignment {} created", added.id);
            0
        }
        Commands::Delete { id } => {
            let removed = service.delete_assignment(AssignmentId::new(id))?;
            println!("assignment {} deleted", removed.id);
            0
        }
        Commands::Publish { term } => {
            let findings = service.publish(term)?;
            print_findings(&findings);
            println!("{term} published");
            0
        }
        Commands::Export { term, format, out } => {
            match out {
                Some(path) => {
                    let file = File::create(&path).with_context(|| format!("creating {path}"))?;
                    service.export(BufWriter::new(file), term, format.into())?;
                }
                None => service.export(std::io::stdout().lock(), term, format.into())?,
            }
            0
        }
        Commands::List { term } => {
            let roster = service.storage().load()?;
            let mut assignments: Vec<_> = roster
                .assignments
                .iter()
                .filter(|a| term.map_or(true, |t| a.term == t))
                .collect();
            assignments.sort_by_key(|a| (a.term, a.weekday, a.room, a.member));
            // impression compacte
            for a in assignments {
                let member = roster.find_member(a.member).map_or("-", |m| m.name.as_str());
                let room = roster.find_room(a.room).map_or("-", |r| r.name.as_str());
                println!("{} | {} | {} | {} | {}", a.id, a.term, a.weekday, room, member);
            }
            0
        }
    };
    Ok(code)
}

fn parse_member_list(list: &str) -> Result<Vec<MemberId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(MemberId::new)
                .with_context(|| format!("invalid member id: {s}"))
        })
        .collect()
}

fn print_findings(findings: &[Finding]) {
    for f in findings {
        println!("[{}] {}: {}", f.severity, f.rule.code(), f.message);
        for line in &f.details {
            println!("    {line}");
        }
    }
}

/// 0 = OK, 2 = avertissements, 1 = erreurs.
fn severity_code(findings: &[Finding]) -> i32 {
    match findings.iter().map(|f| f.severity).min() {
        Some(Severity::Error) => 1,
        Some(Severity::Warning) => 2,
        _ => 0,
    }
}

fn report(err: &RosterError) -> i32 {
    match err {
        RosterError::Violation(v) => eprintln!("error[{}]: {v}", v.code()),
        RosterError::GenerationInfeasible { cells } => {
            eprintln!("error: {err}");
            for cell in cells {
                eprintln!("  unfillable: {cell}");
            }
        }
        other => eprintln!("error: {other}"),
    }
    // 3 = panne de stockage
    if err.is_recoverable() {
        1
    } else {
        3
    }
}
