use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CreatePresetRequest;
use crate::domain::models::GeneratedImage;
use crate::domain::models::JsonMap;
use crate::domain::models::LoginRequest;
use crate::domain::models::Preset;
use crate::domain::models::RegisterRequest;
use crate::domain::models::ShotType;
use crate::domain::models::UpdatePresetRequest;
use crate::domain::models::UploadFile;
use crate::domain::services::format_date;
use crate::domain::services::resolve_image_url;
use crate::domain::services::retry_api_call;
use crate::domain::services::to_base64_preview;
use crate::domain::services::validate_image_file;
use crate::domain::services::RetryPolicy;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::api::Transport;
use crate::infrastructure::credentials::file::FileCredentialStore;
use crate::infrastructure::redirects::terminal::TerminalRedirect;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn print_success(text: &str) {
    println!(
        "{}",
        text.if_supports_color(Stream::Stdout, |text| return text.green())
    );
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.split('\n').next().unwrap_or_default();
    if line.chars().count() > max {
        let head = line.chars().take(max - 3).collect::<String>();
        return format!("{head}...");
    }

    return line.to_string();
}

fn format_image(image: &GeneratedImage, api_url: &str) -> String {
    let shot_type = image
        .shot_type
        .map(|shot_type| return shot_type.label())
        .unwrap_or("Unknown shot");
    let created_at = image
        .created_at
        .as_deref()
        .map(format_date)
        .unwrap_or_default();

    let mut res = format!("- (ID: {}) {created_at}, {shot_type}", image.id);
    if !image.prompt.is_empty() {
        res = format!("{res}, {}", truncate(&image.prompt, 60));
    }

    return format!("{res}\n  {}", resolve_image_url(api_url, &image.url));
}

fn format_preset(preset: &Preset) -> String {
    let shot_type = preset
        .shot_type
        .map(|shot_type| return shot_type.label())
        .unwrap_or("Unknown shot");
    let mut res = format!("- (ID: {}) {}, {shot_type}", preset.id, preset.name);

    if let Some(description) = &preset.description {
        res = format!("{res}, {}", truncate(description, 60));
    }

    return res;
}

fn required<'a, T>(matches: &'a ArgMatches, id: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(val) = matches.get_one::<T>(id) {
        return Ok(val);
    }

    bail!(format!("Missing required argument '{id}'"))
}

fn shot_type_arg(matches: &ArgMatches) -> Result<ShotType> {
    let tag = required::<String>(matches, "shot-type")?;
    if let Some(shot_type) = ShotType::parse(tag) {
        return Ok(shot_type);
    }

    bail!(format!("Unknown shot type '{tag}'"))
}

fn prompt_arg(matches: &ArgMatches) -> Result<Option<JsonMap>> {
    let Some(raw) = matches.get_one::<String>("prompt") else {
        return Ok(None);
    };

    match serde_json::from_str::<JsonMap>(raw) {
        Ok(prompt) => return Ok(Some(prompt)),
        Err(err) => bail!(format!("--prompt must be a JSON object: {err}")),
    }
}

fn password_arg(matches: &ArgMatches, confirm: bool) -> Result<String> {
    if let Some(password) = matches.get_one::<String>("password") {
        return Ok(password.to_string());
    }

    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }

    return Ok(prompt.interact()?);
}

async fn read_image(file_path: &str) -> Result<UploadFile> {
    let file = UploadFile::from_path(&path::PathBuf::from(file_path)).await?;
    validate_image_file(&file)?;
    return Ok(file);
}

/// Sign-in commands count as the auth view, so a 401 there is reported as bad
/// credentials instead of an expired session.
fn api_client(on_auth_view: bool) -> Result<ApiClient> {
    let redirect = if on_auth_view {
        TerminalRedirect::on_auth_view()
    } else {
        TerminalRedirect::default()
    };

    let transport =
        Transport::from_config(Arc::new(FileCredentialStore::default()), Arc::new(redirect))?;
    return Ok(ApiClient::new(transport));
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default().as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn run_account(name: &str, matches: &ArgMatches) -> Result<()> {
    match name {
        "register" => {
            let password = password_arg(matches, true)?;
            let req = RegisterRequest::new(
                required::<String>(matches, "name")?,
                required::<String>(matches, "email")?,
                &password,
            );
            let session = api_client(true)?.register(&req).await?;
            print_success(&format!("Welcome, {}! You are now logged in.", session.user.name));
        }
        "login" => {
            let req = LoginRequest {
                email: required::<String>(matches, "email")?.to_string(),
                password: password_arg(matches, false)?,
            };
            let session = api_client(true)?.login(&req).await?;
            print_success(&format!("Logged in as {}", session.user.email));
        }
        "logout" => {
            let client = api_client(false)?;
            if client.transport().credentials().get().is_none() {
                println!("You are not logged in.");
                return Ok(());
            }

            client.logout().await?;
            print_success("Logged out");
        }
        _ => {
            let client = api_client(false)?;
            let user =
                retry_api_call(&RetryPolicy::from_config()?, || return client.get_user()).await?;
            println!("{} <{}> (ID: {})", user.name, user.email, user.id);
        }
    }

    return Ok(());
}

async fn run_upload(matches: &ArgMatches) -> Result<()> {
    let file = read_image(required::<String>(matches, "file")?).await?;
    let uploaded = api_client(false)?.upload_product(&file).await?;

    let url = uploaded
        .url
        .unwrap_or_else(|| return resolve_image_url(&Config::get(ConfigKey::ApiUrl), &uploaded.path));
    print_success(&format!("Uploaded {} to {url}", file.file_name));
    return Ok(());
}

async fn run_generate(matches: &ArgMatches) -> Result<()> {
    let file = read_image(required::<String>(matches, "file")?).await?;
    let shot_type = shot_type_arg(matches)?;
    let description = matches.get_one::<String>("description");

    println!("Generating a {} shot of {}...", shot_type.label(), file.file_name);
    let image = api_client(false)?
        .generate_image(&file, shot_type, description.map(String::as_str))
        .await?;

    print_success("Image generated");
    println!("{}", format_image(&image, &Config::get(ConfigKey::ApiUrl)));
    return Ok(());
}

async fn run_images(matches: &ArgMatches) -> Result<()> {
    let api_url = Config::get(ConfigKey::ApiUrl);

    match matches.subcommand() {
        Some(("list", list_matches)) => {
            let client = api_client(false)?;
            let search = list_matches.get_one::<String>("search").map(String::as_str);
            let images = retry_api_call(&RetryPolicy::from_config()?, || {
                return client.get_images(search);
            })
            .await?;

            if images.is_empty() {
                println!("There are no images yet. Generate your first one with `shotsmith generate`.");
                return Ok(());
            }

            let lines = images
                .iter()
                .map(|image| return format_image(image, &api_url))
                .collect::<Vec<String>>();
            println!("{}", lines.join("\n"));
        }
        Some(("show", show_matches)) => {
            let id = *required::<i64>(show_matches, "id")?;
            let client = api_client(false)?;
            let image =
                retry_api_call(&RetryPolicy::from_config()?, || return client.get_image(id))
                    .await?;

            println!("{}", format_image(&image, &api_url));
            if let Some(request_id) = &image.request_id {
                println!("  Request: {request_id}");
            }
            if !image.structured_prompt.is_empty() {
                println!(
                    "  Structured prompt:\n{}",
                    serde_json::to_string_pretty(&image.structured_prompt)?
                );
            }
        }
        Some(("delete", delete_matches)) => {
            let id = *required::<i64>(delete_matches, "id")?;
            api_client(false)?.delete_image(id).await?;
            print_success(&format!("Deleted image {id}"));
        }
        Some(("preview", preview_matches)) => {
            let file = read_image(required::<String>(preview_matches, "file")?).await?;
            println!("{}", to_base64_preview(&file));
        }
        _ => {
            subcommand_images().print_long_help()?;
        }
    }

    return Ok(());
}

async fn run_presets(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            let client = api_client(false)?;
            let presets =
                retry_api_call(&RetryPolicy::from_config()?, || return client.get_presets())
                    .await?;

            if presets.is_empty() {
                println!("There are no presets yet. Save one with `shotsmith presets create`.");
                return Ok(());
            }

            let lines = presets.iter().map(format_preset).collect::<Vec<String>>();
            println!("{}", lines.join("\n"));
        }
        Some(("show", show_matches)) => {
            let id = *required::<i64>(show_matches, "id")?;
            let client = api_client(false)?;
            let preset =
                retry_api_call(&RetryPolicy::from_config()?, || return client.get_preset(id))
                    .await?;

            println!("{}", format_preset(&preset));
            if let Some(created_at) = &preset.created_at {
                println!("  Created: {}", format_date(created_at));
            }
            println!(
                "  Structured prompt:\n{}",
                serde_json::to_string_pretty(&preset.structured_prompt)?
            );
        }
        Some(("create", create_matches)) => {
            let client = api_client(false)?;
            let name = required::<String>(create_matches, "name")?;
            let description = create_matches.get_one::<String>("description").cloned();

            let req = if let Some(image_id) = create_matches.get_one::<i64>("from-image") {
                let image = client.get_image(*image_id).await?;
                CreatePresetRequest::from_image(&image, name, description)?
            } else {
                CreatePresetRequest {
                    name: name.to_string(),
                    description,
                    shot_type: shot_type_arg(create_matches)?,
                    structured_prompt: prompt_arg(create_matches)?.unwrap_or_default(),
                }
            };

            let preset = client.create_preset(&req).await?;
            print_success(&format!("Created preset {} (ID: {})", preset.name, preset.id));
        }
        Some(("update", update_matches)) => {
            let id = *required::<i64>(update_matches, "id")?;
            let req = UpdatePresetRequest {
                name: update_matches.get_one::<String>("name").cloned(),
                description: update_matches.get_one::<String>("description").cloned(),
                structured_prompt: prompt_arg(update_matches)?,
            };
            if req.is_empty() {
                bail!("Nothing to update. Pass --name, --description or --prompt");
            }

            let preset = api_client(false)?.update_preset(id, &req).await?;
            print_success(&format!("Updated preset {} (ID: {})", preset.name, preset.id));
        }
        Some(("delete", delete_matches)) => {
            let id = *required::<i64>(delete_matches, "id")?;
            api_client(false)?.delete_preset(id).await?;
            print_success(&format!("Deleted preset {id}"));
        }
        Some(("apply", apply_matches)) => {
            let id = *required::<i64>(apply_matches, "id")?;
            let file = read_image(required::<String>(apply_matches, "file")?).await?;
            let description = apply_matches.get_one::<String>("description");

            let image = api_client(false)?
                .apply_preset(id, &file, description.map(String::as_str))
                .await?;
            print_success(&format!("Applied preset {id} to {}", file.file_name));
            println!("{}", format_image(&image, &Config::get(ConfigKey::ApiUrl)));
        }
        Some(("batch", batch_matches)) => {
            let id = *required::<i64>(batch_matches, "id")?;
            let mut files = vec![];
            if let Some(file_paths) = batch_matches.get_many::<String>("files") {
                for file_path in file_paths {
                    files.push(read_image(file_path).await?);
                }
            }
            let descriptions = batch_matches
                .get_many::<String>("description")
                .map(|vals| return vals.cloned().collect::<Vec<String>>())
                .unwrap_or_default();

            let submission = api_client(false)?
                .batch_generate(id, &files, &descriptions)
                .await?;
            let message = submission
                .message
                .unwrap_or_else(|| return "Batch submitted".to_string());
            print_success(&format!(
                "{message}: {} image(s), status {}",
                submission.count, submission.status
            ));
            println!("Results appear in `shotsmith images list` as they finish.");
        }
        _ => {
            subcommand_presets().print_long_help()?;
        }
    }

    return Ok(());
}

fn arg_shot_type() -> Arg {
    return Arg::new("shot-type")
        .short('s')
        .long("shot-type")
        .num_args(1)
        .help("Composition of the generated photo.")
        .value_parser(PossibleValuesParser::new(ShotType::VARIANTS));
}

fn arg_description() -> Arg {
    return Arg::new("description")
        .short('d')
        .long("description")
        .num_args(1)
        .help("Short description of the product to guide generation.");
}

fn arg_id(help: &'static str) -> Arg {
    return Arg::new("id")
        .help(help)
        .value_parser(value_parser!(i64))
        .required(true);
}

fn arg_file() -> Arg {
    return Arg::new("file")
        .help("Path to a jpg, jpeg, png or webp image of 10 MB or less.")
        .required(true);
}

fn arg_prompt() -> Arg {
    return Arg::new("prompt")
        .long("prompt")
        .num_args(1)
        .help("Structured prompt as a JSON object, e.g. '{\"style\": \"minimalist\"}'.");
}

fn arg_password() -> Arg {
    return Arg::new("password")
        .short('p')
        .long("password")
        .env("SHOTSMITH_PASSWORD")
        .hide_env_values(true)
        .num_args(1)
        .help("Account password. Prompted for when omitted.");
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_images() -> Command {
    return Command::new("images")
        .about("Browse and manage generated images.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List generated images, newest first.")
                .arg(
                    Arg::new("search")
                        .short('q')
                        .long("search")
                        .num_args(1)
                        .help("Only show images matching this text."),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show one generated image with its structured prompt.")
                .arg(arg_id("Image ID")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a generated image. Succeeds if it is already gone.")
                .arg(arg_id("Image ID")),
        )
        .subcommand(
            Command::new("preview")
                .about("Validate a local image and print it as a base64 data URL.")
                .arg(arg_file()),
        );
}

fn subcommand_presets() -> Command {
    return Command::new("presets")
        .about("Manage reusable styling presets.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all presets."))
        .subcommand(
            Command::new("show")
                .about("Show one preset with its structured prompt.")
                .arg(arg_id("Preset ID")),
        )
        .subcommand(
            Command::new("create")
                .about("Create a preset from a generated image or a JSON prompt.")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .num_args(1)
                        .required(true)
                        .help("Preset name."),
                )
                .arg(
                    Arg::new("description")
                        .short('d')
                        .long("description")
                        .num_args(1)
                        .help("What the preset is for."),
                )
                .arg(
                    Arg::new("from-image")
                        .long("from-image")
                        .num_args(1)
                        .value_parser(value_parser!(i64))
                        .help("Copy the styling of this generated image."),
                )
                .arg(arg_prompt().requires("shot-type"))
                .arg(arg_shot_type().conflicts_with("from-image"))
                .group(
                    ArgGroup::new("source")
                        .args(["from-image", "prompt"])
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Rename a preset or change its description or prompt. The shot type cannot change.")
                .arg(arg_id("Preset ID"))
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .num_args(1)
                        .help("New name."),
                )
                .arg(
                    Arg::new("description")
                        .short('d')
                        .long("description")
                        .num_args(1)
                        .help("New description."),
                )
                .arg(arg_prompt()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a preset.")
                .arg(arg_id("Preset ID")),
        )
        .subcommand(
            Command::new("apply")
                .about("Generate an image of a product with a preset's styling.")
                .arg(arg_id("Preset ID"))
                .arg(arg_file())
                .arg(arg_description()),
        )
        .subcommand(
            Command::new("batch")
                .about("Queue several products for generation with one preset.")
                .arg(arg_id("Preset ID"))
                .arg(
                    Arg::new("files")
                        .help("Paths to product images.")
                        .num_args(1..)
                        .required(true),
                )
                .arg(
                    arg_description()
                        .action(ArgAction::Append)
                        .help("Product description. Repeat once per file, in order."),
                ),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("shotsmith")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(
            Command::new("register")
                .about("Create an account and log in.")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .num_args(1)
                        .required(true)
                        .help("Display name."),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .num_args(1)
                        .required(true)
                        .help("Account email."),
                )
                .arg(arg_password()),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and store the session token.")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .env("SHOTSMITH_EMAIL")
                        .num_args(1)
                        .required(true)
                        .help("Account email."),
                )
                .arg(arg_password()),
        )
        .subcommand(Command::new("logout").about("Log out and forget the stored session token."))
        .subcommand(Command::new("whoami").about("Show the logged in account."))
        .subcommand(
            Command::new("upload")
                .about("Upload a product image without generating.")
                .arg(arg_file()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a product photo from an uploaded image.")
                .arg(arg_file())
                .arg(arg_shot_type().required(true))
                .arg(arg_description()),
        )
        .subcommand(subcommand_images())
        .subcommand(subcommand_presets())
        .subcommand(subcommand_config())
        .subcommand(subcommand_completions())
        .arg(
            Arg::new(ConfigKey::ApiUrl.to_string())
                .short('u')
                .long(ConfigKey::ApiUrl.to_string())
                .env("SHOTSMITH_API_URL")
                .num_args(1)
                .help(format!("Base URL of the Shotsmith API. [default: {}]", Config::default(ConfigKey::ApiUrl)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SHOTSMITH_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CredentialFile.to_string())
                .long(ConfigKey::CredentialFile.to_string())
                .env("SHOTSMITH_CREDENTIAL_FILE")
                .num_args(1)
                .help(format!("File the login token is stored in. [default: {}]", Config::default(ConfigKey::CredentialFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("SHOTSMITH_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before a request times out. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RetryAttempts.to_string())
                .long(ConfigKey::RetryAttempts.to_string())
                .env("SHOTSMITH_RETRY_ATTEMPTS")
                .num_args(1)
                .help(format!("Maximum attempts for read-only requests. [default: {}]", Config::default(ConfigKey::RetryAttempts)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RetryDelay.to_string())
                .long(ConfigKey::RetryDelay.to_string())
                .env("SHOTSMITH_RETRY_DELAY")
                .num_args(1)
                .help(format!("Delay in milliseconds before the first retry. [default: {}]", Config::default(ConfigKey::RetryDelay)))
                .global(true),
        );
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default());
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("images", subcmd_matches)) => {
            let mut arg_matches = vec![&matches, subcmd_matches];
            if let Some((_, leaf_matches)) = subcmd_matches.subcommand() {
                arg_matches.push(leaf_matches);
            }
            Config::load(arg_matches).await?;
            run_images(subcmd_matches).await?;
        }
        Some(("presets", subcmd_matches)) => {
            let mut arg_matches = vec![&matches, subcmd_matches];
            if let Some((_, leaf_matches)) = subcmd_matches.subcommand() {
                arg_matches.push(leaf_matches);
            }
            Config::load(arg_matches).await?;
            run_presets(subcmd_matches).await?;
        }
        Some(("upload", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            run_upload(subcmd_matches).await?;
        }
        Some(("generate", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            run_generate(subcmd_matches).await?;
        }
        Some((name, subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            run_account(name, subcmd_matches).await?;
        }
        None => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}
