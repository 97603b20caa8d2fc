use std::error::Error;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use atty::Stream;
use blogsmith::api::BlogApi;
use blogsmith::config::{self, HumanizerConfig, LangflowConfig, ProxyConfig};
use blogsmith::session::Session;
use blogsmith::{BlogError, GenerateBlogForm, GeneratedContent, GenerationRequest, split_list};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "blogsmith",
    about = "Generate, humanize and publish blog posts",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the generation proxy.
    Serve(ServeArgs),
    /// Generate a blog through a running proxy and publish it.
    Generate(GenerateArgs),
    /// Publish a local markdown file as HTML.
    Render {
        /// File holding the blog text.
        path: PathBuf,
        /// Comma-separated keywords to link.
        #[arg(long, default_value = "")]
        keywords: String,
        /// Comma-separated URLs, paired with the keywords by position.
        #[arg(long, default_value = "")]
        urls: String,
    },
    /// Reshape a rewritten file after the structure of an original.
    Preserve {
        original: PathBuf,
        rewritten: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "BLOGSMITH_ADDR", default_value = "127.0.0.1:5000")]
    addr: SocketAddr,
    #[arg(long, env = "LANGFLOW_BASE_URL", default_value = config::DEFAULT_LANGFLOW_BASE_URL)]
    langflow_url: String,
    #[arg(long, env = "LANGFLOW_FLOW_PATH", default_value = config::DEFAULT_FLOW_PATH)]
    flow_path: String,
    #[arg(long, env = "LANGFLOW_PROMPT_NODE", default_value = config::DEFAULT_PROMPT_NODE)]
    prompt_node: String,
    /// Bearer token for the workflow service.
    #[arg(long, env = "LANGFLOW_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long, env = "HUMANIZER_URL", default_value = config::DEFAULT_HUMANIZER_URL)]
    humanizer_url: String,
}

impl ServeArgs {
    fn into_config(self) -> ProxyConfig {
        ProxyConfig {
            addr: self.addr,
            langflow: LangflowConfig {
                base_url: self.langflow_url,
                flow_path: self.flow_path,
                prompt_node: self.prompt_node,
                token: self.token,
                ..LangflowConfig::default()
            },
            humanizer: HumanizerConfig {
                base_url: self.humanizer_url,
                ..HumanizerConfig::default()
            },
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long)]
    topic: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    audience: String,
    /// Comma-separated keywords.
    #[arg(long)]
    keywords: String,
    /// Comma-separated URLs, paired with the keywords by position.
    #[arg(long)]
    urls: String,
    /// Proxy base URL.
    #[arg(long, env = "BLOGSMITH_SERVER", default_value = config::DEFAULT_SERVER_URL)]
    server: String,
    /// Run the generated text through the humanizer before publishing.
    #[arg(long)]
    humanize: bool,
    /// Print the markdown instead of the published HTML.
    #[arg(long)]
    raw: bool,
    /// Write the output here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Serve(_)));
    match cli.command {
        Command::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(blogsmith::web::serve(args.into_config()))?;
            Ok(())
        }
        Command::Generate(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(handle_generate(args, cli.json))
        }
        Command::Render {
            path,
            keywords,
            urls,
        } => handle_render(path, &keywords, &urls, cli.json),
        Command::Preserve {
            original,
            rewritten,
        } => handle_preserve(original, rewritten, cli.json),
    }
}

fn init_tracing(serving: bool) {
    let default = if serving { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn user_error(err: BlogError) -> Box<dyn Error> {
    err.user_message().into()
}

async fn handle_generate(args: GenerateArgs, as_json: bool) -> Result<(), Box<dyn Error>> {
    let form = GenerateBlogForm {
        topic: Some(args.topic),
        country: Some(args.country),
        audience: Some(args.audience),
        keywords: Some(args.keywords),
        urls: Some(args.urls),
    };
    let request = GenerationRequest::from_form(&form).map_err(user_error)?;
    let api = BlogApi::new(args.server)?;
    let mut session = Session::new();

    session.submit(request.clone()).map_err(user_error)?;
    let generated = api
        .generate_blog(&request)
        .await
        .map(|outcome| GeneratedContent {
            raw_text: outcome.blog,
        });
    session.complete_generation(generated).map_err(user_error)?;

    if args.humanize {
        let text = session.begin_humanize().map_err(user_error)?;
        let result = api.humanize(&text, &request.keywords).await;
        let humanized = session.complete_humanize(result).map_err(user_error)?;
        if !as_json {
            eprintln!(
                "AI likelihood {:.0}% -> {:.0}% ({} sources checked)",
                humanized.original_score, humanized.humanized_score, humanized.sources_checked
            );
        }
    }

    let markdown = session
        .content()
        .map(|content| content.raw_text.clone())
        .unwrap_or_default();
    let html = session.publish().map_err(user_error)?.html().to_string();

    if as_json {
        let payload = json!({
            "blog": markdown,
            "html": html,
            "humanized": session.humanized(),
            "transitions": session.transitions(),
        });
        return emit(&serde_json::to_string_pretty(&payload)?, args.out);
    }
    if args.raw {
        if args.out.is_none() && stdout_is_tty() {
            render_markdown_block("Generated Blog", &markdown);
            return Ok(());
        }
        return emit(&markdown, args.out);
    }
    emit(&html, args.out)
}

fn handle_render(
    path: PathBuf,
    keywords: &str,
    urls: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    let keywords = split_list(keywords);
    let urls = split_list(urls);
    if keywords.len() != urls.len() {
        eprintln!(
            "warning: {} keywords but {} urls; only the first {} pairs are linked",
            keywords.len(),
            urls.len(),
            keywords.len().min(urls.len())
        );
    }
    let document = blogsmith::publish(&text, &keywords, &urls);
    if as_json {
        let payload = json!({ "html": document.html() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", document.html());
    }
    Ok(())
}

fn handle_preserve(
    original: PathBuf,
    rewritten: PathBuf,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let original_text = fs::read_to_string(&original)
        .map_err(|err| format!("Failed to read {}: {err}", original.display()))?;
    let rewritten_text = fs::read_to_string(&rewritten)
        .map_err(|err| format!("Failed to read {}: {err}", rewritten.display()))?;
    let reshaped = blogsmith::preserve(&original_text, &rewritten_text);
    if as_json {
        let payload = json!({ "text": reshaped });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if stdout_is_tty() {
        render_markdown_block("Reshaped", &reshaped);
    } else {
        println!("{reshaped}");
    }
    Ok(())
}

fn emit(text: &str, out: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            fs::write(&path, text)
                .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    let skin = MadSkin::default();
    let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
    println!("{formatted}");
}
