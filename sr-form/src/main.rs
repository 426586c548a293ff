use anyhow::Context;
use shared::FormFields;
use sr_client::HttpClient;
use sr_form::{
    DraftStore, FormConfig, FormContext, FormController, FormView, RedbDraftBackend,
    SubmitOutcome, SystemClock, init_logger_with_file,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

const USAGE: &str = "usage: sr-intake [<fields.json> | --reset]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = FormConfig::from_env();
    let _log_guard = init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(api = %config.api_base_url, "sr-intake starting");

    let reference = config
        .load_reference_data()
        .context("Failed to load reference data")?;

    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("Failed to create {}", config.work_dir.display()))?;
    let backend = RedbDraftBackend::open(config.draft_db_path())
        .with_context(|| format!("Failed to open {}", config.draft_db_path().display()))?;
    let client = HttpClient::new(&config.client_config())?;

    let controller = FormController::mount(FormContext {
        drafts: DraftStore::new(Arc::new(backend), Arc::new(SystemClock)),
        service: Arc::new(client),
        reference: Arc::new(reference),
        policy: config.attachment_policy,
        debounce: config.draft_debounce(),
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&controller, &args).await;
    controller.unmount();
    result
}

async fn run(controller: &FormController, args: &[String]) -> anyhow::Result<()> {
    match args {
        [flag] if flag == "--reset" => {
            match controller.reset(&ask) {
                Ok(()) => println!("입력 내용과 임시 저장본을 삭제했습니다."),
                Err(e) => println!("{e}"),
            }
            Ok(())
        }
        [path] => submit_file(controller, Path::new(path)).await,
        [] => {
            println!("{USAGE}");
            print_view(&controller.view());
            Ok(())
        }
        _ => anyhow::bail!(USAGE),
    }
}

async fn submit_file(controller: &FormController, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let incoming: FormFields =
        serde_json::from_str(&raw).with_context(|| format!("Invalid form values in {}", path.display()))?;

    controller.edit(|fields| fields.overlay(&incoming));
    if !incoming.system_name.trim().is_empty() && incoming.assignee.trim().is_empty() {
        controller.select_system(&incoming.system_name);
    }
    print_view(&controller.view());

    match controller.submit().await {
        SubmitOutcome::Submitted(ticket) => {
            println!("접수 완료: {} ({})", ticket.ticket_id, ticket.status);
        }
        SubmitOutcome::Invalid(errors) => {
            controller.save_draft_now();
            for (field, message) in errors.iter() {
                println!("  {}: {message}", field.label());
            }
        }
        SubmitOutcome::Failed(_) => {
            controller.save_draft_now();
            if let Some(notification) = controller.view().notification {
                println!("{}: {}", notification.title, notification.message);
            }
        }
        SubmitOutcome::Busy | SubmitOutcome::Disposed => {}
    }
    Ok(())
}

fn print_view(view: &FormView) {
    if view.draft_restored {
        match view.restored_from {
            Some(saved_at) => println!("임시 저장본을 불러왔습니다 ({saved_at})"),
            None => println!("임시 저장본을 불러왔습니다"),
        }
    }
    println!("작성 진행률: {}%", view.progress);
}

fn ask(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
