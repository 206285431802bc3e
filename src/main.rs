use std::{io::BufRead, path::PathBuf, str::FromStr, sync::Arc, thread};

use clap::Parser;
use peopledesk::{
    consts::consts::{PersonId, TOKEN_KEY},
    http::{
        client::ApiClient,
        interceptor::{BearerToken, SessionExpiry},
    },
    model::person::PersonRecord,
    notify::{Level, Notification, Notifier},
    options::{ApiVersion, ClientOptions},
    persons::{
        controller::SearchController,
        editor::{Field, FormRecord, PersonForm, ValidationRules},
        list::{PersonListView, DELETE_PROMPT},
        source::{PersonSource, PersonsV1Source, PersonsV2Source},
    },
    router::route::{self, Navigator, Route},
    session::{auth::AuthContext, session::SessionStore},
    storage::{file::FileStore, KeyValueStore},
    views::{
        login::LoginView,
        render::{render_footer, render_form, render_form_errors, render_table},
    },
};

/// 👥 Peopledesk, a terminal client for the person registry api
///
/// Type `help` once running for the list of commands
#[derive(Parser, Debug)]
struct Cli {
    /// Base url of the api, e.g. http://localhost:3000
    #[clap(short = 'u', long, env = "PEOPLEDESK_API_URL")]
    api_url: Option<String>,

    /// Api generation to talk to, v1 (flat list) or v2 (paged, with address)
    #[clap(long, env = "PEOPLEDESK_API_VERSION", default_value = "v2")]
    api_version: ApiVersion,

    /// File the session token and user are kept in. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, env = "PEOPLEDESK_SESSION_FILE", default_value = "data/session.json")]
    session_file: PathBuf,

    /// Rows requested per page
    #[clap(short, long, env = "PEOPLEDESK_ITEMS_PER_PAGE", default_value = "5")]
    items_per_page: usize,

    /// Require gender and a fully formatted CPF, email becomes optional
    #[clap(long, env = "PEOPLEDESK_STRICT_VALIDATION")]
    strict: bool,
}

const HELP: &str = "Commands:
  login <username> <password>   sign in
  logout                        sign out
  whoami                        show the signed in user
  goto <path>                   open a page, e.g. /dashboard
  list                          reload the current page
  search [term]                 filter by name (empty clears)
  page <n> | next | prev        move between pages
  add | edit <id>               open the editor
  set <field> <value>           change an editor field
  form                          show the editor
  save | cancel                 submit or close the editor
  delete <id>                   delete a person
  quit";

/// Everything the front end shares regardless of api version
struct App {
    options: ClientOptions,
    navigator: Navigator,
    session: Arc<SessionStore>,
    notifier: Notifier,
    notifications: flume::Receiver<Notification>,
    input: flume::Receiver<String>,
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let options = ClientOptions::default()
        .set_base_url(args.api_url)
        .set_api_version(args.api_version)
        .set_items_per_page(args.items_per_page)
        .set_session_file(args.session_file)
        .set_validation(if args.strict {
            ValidationRules::strict()
        } else {
            ValidationRules::standard()
        });

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(options.session_file.clone())?);

    let home = options.api_version.home_route();
    let initially_authenticated = store.get(TOKEN_KEY)?.is_some();
    let navigator = Navigator::new(route::guard(home, initially_authenticated));

    let client = ApiClient::new(&options)?
        .with_request_interceptor(Arc::new(BearerToken::new(store.clone())))
        .with_response_interceptor(Arc::new(SessionExpiry::new(
            store.clone(),
            navigator.clone(),
        )));

    log::info!(
        "Peopledesk using api {} at {}",
        options.api_version,
        client.base_url()
    );

    let session = Arc::new(SessionStore::new(store, client.clone()));
    let (notifier, notifications) = Notifier::new();

    // Stdin blocks, it gets its own thread and feeds lines to the event loop
    let (input_sender, input) = flume::unbounded();

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if input_sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Unable to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    let app = App {
        options,
        navigator,
        session,
        notifier,
        notifications,
        input,
    };

    match app.options.api_version {
        ApiVersion::V1 => run(PersonsV1Source::new(client), app).await,
        ApiVersion::V2 => run(PersonsV2Source::new(client), app).await,
    }
}

async fn run<S>(source: S, app: App) -> anyhow::Result<()>
where
    S: PersonSource,
    S::Record: FormRecord,
{
    let App {
        options,
        navigator,
        session,
        notifier,
        notifications,
        input,
    } = app;

    let home = options.api_version.home_route();

    let controller = SearchController::new(
        source,
        notifier.clone(),
        options.items_per_page,
        options.search_debounce,
    );
    let list = PersonListView::new(controller, notifier.clone());

    let mut auth = AuthContext::new(session.clone());
    let mut login = LoginView::new(
        auth.clone(),
        navigator.clone(),
        notifier.clone(),
        home.clone(),
    );
    let mut form: Option<PersonForm> = None;

    let mut routes = navigator.subscribe();
    let mut revisions = list.controller().subscribe();

    println!("{}", HELP);
    enter_route(&navigator.current(), &login, &list).await;

    loop {
        tokio::select! {
            line = input.recv_async() => {
                // Stdin closed
                let Ok(line) = line else { break };

                let flow = handle_command(
                    line.trim(),
                    &input,
                    &options,
                    &navigator,
                    &auth,
                    &mut login,
                    &list,
                    &mut form,
                )
                .await;

                if let Flow::Quit = flow {
                    break;
                }
            }
            changed = routes.changed() => {
                if changed.is_err() {
                    break;
                }

                let route = routes.borrow_and_update().clone();

                // Redirects (login, logout, 401) are a page load, the flag is read again from the store
                auth = AuthContext::new(session.clone());
                login = LoginView::new(auth.clone(), navigator.clone(), notifier.clone(), home.clone());

                let guarded = auth.guard(route.clone());

                if guarded != route {
                    navigator.navigate(guarded);
                    continue;
                }

                if route.is_login() {
                    form = None;
                    list.close();
                }

                enter_route(&route, &login, &list).await;
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }

                revisions.borrow_and_update();

                let state = list.controller().snapshot();

                if !state.is_loading && navigator.current().is_protected() {
                    println!("{}", render_table(&state.persons));
                    println!("{}", render_footer(&state));
                }
            }
            notification = notifications.recv_async() => {
                if let Ok(notification) = notification {
                    print_notification(&notification);
                }
            }
        }
    }

    log::info!("Bye");

    Ok(())
}

async fn enter_route<S: PersonSource>(route: &Route, login: &LoginView, list: &PersonListView<S>) {
    println!("== {} ==", route.path());

    if route.is_login() {
        if let Some(banner) = login.session_expired_banner() {
            println!("{}", banner);
        }

        println!("Sign in with: login <username> <password>");
        return;
    }

    list.controller().refresh().await;
}

fn print_notification(notification: &Notification) {
    match notification.level {
        Level::Error => eprintln!("[{}] {}", notification.level, notification.message),
        _ => println!("[{}] {}", notification.level, notification.message),
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_command<S>(
    line: &str,
    input: &flume::Receiver<String>,
    options: &ClientOptions,
    navigator: &Navigator,
    auth: &AuthContext,
    login: &mut LoginView,
    list: &PersonListView<S>,
    form: &mut Option<PersonForm>,
) -> Flow
where
    S: PersonSource,
    S::Record: FormRecord,
{
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let protected = navigator.current().is_protected();

    match command {
        "" => {}
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Flow::Quit,
        "login" => {
            let (username, password) = rest.split_once(' ').unwrap_or((rest, ""));

            login.username = username.to_string();
            login.password = password.trim().to_string();

            if let Ok(session) = login.submit().await {
                log::info!(
                    "Signed in as {}",
                    session.user.name.as_deref().unwrap_or(session.user.id.as_str())
                );
            }
        }
        "goto" => {
            let target = Route::parse(rest);

            // The other api version's list is not served by this session
            if target.is_protected() && target != options.api_version.home_route() {
                println!("{} is not available with api {}", rest, options.api_version);
            } else {
                navigator.navigate(target);
            }
        }
        _ if !protected => println!("Sign in first, type help for commands"),
        "whoami" => match auth.session().current_user() {
            Some(user) => println!(
                "{} ({})",
                user.name.as_deref().unwrap_or(user.id.as_str()),
                user.email.as_deref().unwrap_or("-")
            ),
            None => println!("No user descriptor stored"),
        },
        "logout" => {
            auth.logout();
            navigator.navigate(Route::login());
        }
        "list" => list.controller().refresh().await,
        "search" => list.controller().set_search_term(rest),
        "next" => {
            if !list.controller().next_page().await {
                println!("Already on the last page");
            }
        }
        "prev" => {
            if !list.controller().previous_page().await {
                println!("Already on the first page");
            }
        }
        "page" => match rest.parse::<usize>() {
            Ok(page) => {
                if !list.controller().go_to_page(page).await {
                    println!("No page {}", page);
                }
            }
            Err(_) => println!("Usage: page <n>"),
        },
        "add" => {
            list.open_add();
            *form = list.form();
            print_form::<S>(form);
        }
        "edit" => {
            let id = PersonId::from(rest);
            let record = list
                .controller()
                .snapshot()
                .persons
                .into_iter()
                .find(|p| p.person_id().as_ref() == Some(&id));

            match record {
                Some(record) => {
                    list.open_edit(record);
                    *form = list.form();
                    print_form::<S>(form);
                }
                None => println!("No person {} on this page", id),
            }
        }
        "set" => match form.as_mut() {
            Some(current) => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));

                match Field::from_str(name) {
                    Ok(field) if <S::Record as FormRecord>::fields().contains(&field) => {
                        current.set(field, value.trim())
                    }
                    _ => println!("Unknown field {}", name),
                }
            }
            None => println!("Open the editor first with add or edit"),
        },
        "form" => print_form::<S>(form),
        "save" => match form.as_ref() {
            Some(current) => match current.submit::<S::Record>(&options.validation) {
                Ok(record) => {
                    if list.save(record).await.is_ok() {
                        *form = None;
                    }
                }
                Err(failure) => {
                    for message in render_form_errors(&failure) {
                        println!("{}", message);
                    }
                }
            },
            None => println!("Open the editor first with add or edit"),
        },
        "cancel" => {
            list.close();
            *form = None;
        }
        "delete" => {
            println!("{} [y/N]", DELETE_PROMPT);

            let confirmed = matches!(
                input.recv_async().await.as_deref().map(str::trim),
                Ok("y") | Ok("Y") | Ok("yes")
            );

            let _ = list
                .delete(&PersonId::from(rest), &move |_: &str| confirmed)
                .await;
        }
        _ => println!("Unknown command {}, type help for commands", command),
    }

    Flow::Continue
}

fn print_form<S>(form: &Option<PersonForm>)
where
    S: PersonSource,
    S::Record: FormRecord,
{
    match form {
        Some(form) => println!("{}", render_form(form, <S::Record as FormRecord>::fields())),
        None => println!("The editor is closed"),
    }
}
