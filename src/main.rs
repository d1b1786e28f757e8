//! letstalk-kg CLI: build, load, export and analyse the LetsTalk knowledge graph.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use rand::SeedableRng;
use rand::rngs::StdRng;

use letstalk_kg::analysis::{self, ClusterRequest, ClusterResponse};
use letstalk_kg::assemble::KeywordMatch;
use letstalk_kg::config::PipelineConfig;
use letstalk_kg::pipeline;
use letstalk_kg::source::SourceDir;
use letstalk_kg::store::{BindingRow, TripleStoreClient};

#[derive(Parser)]
#[command(name = "letstalk-kg", version, about = "LetsTalk knowledge-graph pipeline")]
struct Cli {
    /// Config file (defaults to ./letstalk.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the ontology (TBox) as Turtle.
    Ontology {
        /// Output file [default: graph.tbox from config].
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Assemble the instance graph (ABox) from source collections.
    Build {
        /// Directory with the collection files.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Number of synthetic users.
        #[arg(long)]
        users: Option<usize>,

        /// Output file [default: graph.abox from config].
        #[arg(long)]
        out: Option<PathBuf>,

        /// RNG seed for reproducible users.
        #[arg(long)]
        seed: Option<u64>,

        /// Tag keywords only on whole-word matches.
        #[arg(long)]
        whole_word: bool,
    },

    /// Upload Turtle files to the triple store, in order.
    Load {
        /// Files to upload [default: the TBox then the ABox].
        files: Vec<PathBuf>,
    },

    /// Export all statements as a tab-separated triples table.
    Export {
        /// Output table [default: analysis.triples from config].
        #[arg(long)]
        out: Option<PathBuf>,

        /// Read statements from a local Turtle file instead of the store.
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Run a SPARQL SELECT or ASK query and print the bindings.
    Query {
        /// Query text.
        sparql: Option<String>,

        /// Read the query from a file.
        #[arg(long, conflicts_with = "sparql")]
        file: Option<PathBuf>,

        /// Query these local Turtle files instead of the store.
        #[arg(long = "local", value_name = "TTL")]
        local: Vec<PathBuf>,
    },

    /// Cluster users by their embeddings and print the JSON response.
    Cluster {
        /// Request JSON, e.g. '{"eps": 3.0, "max_users": 50}'.
        #[arg(long)]
        request: Option<String>,

        /// Model directory [default: analysis.model_dir from config].
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Triples table [default: analysis.triples from config].
        #[arg(long)]
        triples: Option<PathBuf>,

        /// RNG seed for user sampling.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Ontology { out } => {
            let out = out.unwrap_or_else(|| config.graph.tbox.clone());
            let count = pipeline::write_ontology(&out)?;
            println!("Wrote {count} schema statements to {}", out.display());
        }

        Commands::Build {
            source,
            users,
            out,
            seed,
            whole_word,
        } => {
            let dir = SourceDir::new(source.unwrap_or_else(|| config.source.dir.clone()));
            let users = users.unwrap_or(config.graph.users);
            let out = out.unwrap_or_else(|| config.graph.abox.clone());
            let mut options = config.graph.to_assembly_options();
            if whole_word {
                options.keyword_match = KeywordMatch::WholeWord;
            }

            let mut rng = rng_for(seed.or(config.graph.seed));
            let (data, assembly) = pipeline::build_abox(&dir, users, &options, &mut rng, &out)?;

            println!("Wrote {} statements to {}", assembly.graph.len(), out.display());
            for (collection, keywords) in data.news.iter().zip(&assembly.keywords) {
                println!("  {:<14} {}", collection.topic.collection(), keywords.join(", "));
            }
        }

        Commands::Load { files } => {
            let files = if files.is_empty() {
                vec![config.graph.tbox.clone(), config.graph.abox.clone()]
            } else {
                files
            };
            let client = TripleStoreClient::new(config.store.clone());
            let mut failed = 0usize;
            for file in &files {
                println!("Importing {} ...", file.display());
                match client.upload_file(file) {
                    Ok(report) => println!("  imported {} bytes", report.bytes),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{:?}", miette::Report::new(e));
                    }
                }
            }
            if failed > 0 {
                miette::bail!("{failed} of {} uploads failed", files.len());
            }
        }

        Commands::Export { out, from_file } => {
            let out = out.unwrap_or_else(|| config.analysis.triples.clone());
            let count = match from_file {
                Some(path) => pipeline::export_local(&[path], &out)?,
                None => pipeline::export_remote(&TripleStoreClient::new(config.store.clone()), &out)?,
            };
            println!("Saved {count} triples to {}", out.display());
        }

        Commands::Query { sparql, file, local } => {
            let sparql = match (sparql, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading query file {}", path.display()))?,
                (None, None) => miette::bail!("pass a query or --file <query.rq>"),
            };
            let rows = if local.is_empty() {
                TripleStoreClient::new(config.store.clone()).query(&sparql)?
            } else {
                pipeline::query_local(&local, &sparql)?
            };
            print_bindings(&rows);
        }

        Commands::Cluster {
            request,
            model_dir,
            triples,
            seed,
        } => {
            let model_dir = model_dir.unwrap_or_else(|| config.analysis.model_dir.clone());
            let triples = triples.unwrap_or_else(|| config.analysis.triples.clone());
            let response = match parse_request(request.as_deref(), &config.analysis.request) {
                Ok(req) => {
                    analysis::run_clustering(&model_dir, &triples, &req, &mut rng_for(seed))
                }
                Err(message) => ClusterResponse::Error { message },
            };
            let json = serde_json::to_string_pretty(&response).into_diagnostic()?;
            println!("{json}");
        }
    }

    Ok(())
}

/// One line per solution, `?var=value` pairs separated by tabs.
fn print_bindings(rows: &[BindingRow]) {
    for row in rows {
        let line = row
            .iter()
            .map(|(var, value)| format!("?{var}={value}"))
            .collect::<Vec<_>>()
            .join("\t");
        println!("{line}");
    }
    eprintln!("{} result(s)", rows.len());
}

/// Overlay the request JSON on the configured defaults.
fn parse_request(json: Option<&str>, defaults: &ClusterRequest) -> Result<ClusterRequest, String> {
    let Some(json) = json else {
        return Ok(defaults.clone());
    };
    let mut base = serde_json::to_value(defaults).map_err(|e| e.to_string())?;
    let overlay: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("invalid request JSON: {e}"))?;
    let (Some(base_map), Some(overlay_map)) = (base.as_object_mut(), overlay.as_object()) else {
        return Err("request must be a JSON object".into());
    };
    for (k, v) in overlay_map {
        base_map.insert(k.clone(), v.clone());
    }
    serde_json::from_value(base).map_err(|e| format!("invalid request: {e}"))
}
