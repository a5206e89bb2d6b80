use clap::Parser;
use fishvault::cli::commands::{add::AddArgs, update::UpdateArgs};
use fishvault::cli::{commands, init_logging, output, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli).await,
        Commands::Add {
            ref title,
            ref username,
            ref url,
            ref notes,
            ref category,
            generate,
        } => {
            let args = AddArgs {
                title,
                username,
                url: url.as_deref(),
                notes: notes.as_deref(),
                category: category.as_deref(),
                generate,
            };
            commands::add::execute(&cli, args).await
        }
        Commands::List => commands::list::execute(&cli).await,
        Commands::Show { ref id, reveal } => commands::show::execute(&cli, id, reveal).await,
        Commands::Copy { ref id } => commands::copy::execute(&cli, id).await,
        Commands::Update {
            ref id,
            ref title,
            ref username,
            ref url,
            ref notes,
            ref category,
            new_secret,
            generate,
        } => {
            let args = UpdateArgs {
                title: title.as_deref(),
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                category: category.as_deref(),
                new_secret,
                generate,
            };
            commands::update::execute(&cli, id, args).await
        }
        Commands::Delete { ref id, force } => commands::delete::execute(&cli, id, force).await,
        Commands::Search { ref query } => commands::search::execute(&cli, query).await,
        Commands::Generate { length } => commands::generate::execute(&cli, length),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
