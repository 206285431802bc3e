#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, Mutex},
    thread,
};

use actix_web::{
    delete, get, post, put,
    web::{self, Data},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use peopledesk::{
    http::{
        client::ApiClient,
        interceptor::{BearerToken, SessionExpiry},
    },
    model::{
        page::{Pagination, PersonPage},
        person::{Address, Gender, Person, PersonV2},
        session::LoginRequest,
    },
    options::ClientOptions,
    router::route::Navigator,
    storage::KeyValueStore,
};
use serde::Deserialize;
use serde_json::json;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// Records and the one token the fake backend accepts
pub struct BackendState {
    pub people: Mutex<Vec<PersonV2>>,
    pub valid_token: Mutex<String>,
    /// Login answers 500 while set
    pub failing_login: Mutex<bool>,
    next_id: Mutex<u64>,
}

impl BackendState {
    pub fn with_people(count: u64) -> Self {
        Self {
            people: Mutex::new((1..=count).map(new_person).collect()),
            valid_token: Mutex::new("token-1".to_string()),
            failing_login: Mutex::new(false),
            next_id: Mutex::new(count + 1),
        }
    }

    /// Every token handed out so far stops working, as if it expired server side
    pub fn expire_tokens(&self) {
        *self.valid_token.lock().unwrap() = "rotated".to_string();
    }
}

pub fn new_person(id: u64) -> PersonV2 {
    PersonV2 {
        id: Some(id),
        name: format!("Person {:02}", id),
        gender: Some(Gender::O),
        email: format!("person{}@example.com", id),
        date_of_birth: "1990-01-01".to_string(),
        nationality: "Brazilian".to_string(),
        naturalness: "Recife".to_string(),
        cpf: format!("000.000.{:03}-00", id),
        address: Address {
            street: format!("Street {}", id),
            city: "Recife".to_string(),
            state: "PE".to_string(),
            zip_code: String::new(),
        },
    }
}

fn to_v1(person: &PersonV2) -> Person {
    Person {
        id: person.id.map(Into::into),
        name: person.name.clone(),
        gender: person.gender.unwrap_or_default(),
        email: person.email.clone(),
        date_of_birth: person.date_of_birth.clone(),
        nationality: person.nationality.clone(),
        naturalness: person.naturalness.clone(),
        cpf: person.cpf.clone(),
    }
}

fn message(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": message }))
}

fn authorized(request: &HttpRequest, state: &BackendState) -> bool {
    let expected = format!("Bearer {}", state.valid_token.lock().unwrap());

    request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false)
}

macro_rules! require_token {
    ($request:expr, $state:expr) => {
        if !authorized(&$request, &$state) {
            return message(
                actix_web::http::StatusCode::UNAUTHORIZED,
                "Invalid or expired token",
            );
        }
    };
}

#[post("/auth/login")]
async fn login(state: Data<BackendState>, body: web::Json<LoginRequest>) -> impl Responder {
    if *state.failing_login.lock().unwrap() {
        return message(
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        );
    }

    if body.username != USERNAME || body.password != PASSWORD {
        return message(
            actix_web::http::StatusCode::UNAUTHORIZED,
            "Invalid credentials",
        );
    }

    let token = state.valid_token.lock().unwrap().clone();

    HttpResponse::Ok().json(json!({ "access_token": token, "user_id": 1 }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
    page: usize,
    items_per_page: usize,
    #[serde(default)]
    person_name: String,
}

#[get("/v2/persons")]
async fn list_v2(
    request: HttpRequest,
    state: Data<BackendState>,
    params: web::Query<PageParams>,
) -> impl Responder {
    require_token!(request, state);

    let needle = params.person_name.to_lowercase();
    let matching: Vec<PersonV2> = state
        .people
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    let page = PersonPage::from_slice(&matching, params.page, params.items_per_page);

    HttpResponse::Ok().json(PersonPage {
        persons: page.persons,
        pagination: Pagination {
            total_items: page.pagination.total_items,
            items_per_page: params.items_per_page,
        },
    })
}

#[post("/v2/persons")]
async fn create_v2(
    request: HttpRequest,
    state: Data<BackendState>,
    body: web::Json<PersonV2>,
) -> impl Responder {
    require_token!(request, state);

    let mut people = state.people.lock().unwrap();

    if people
        .iter()
        .any(|p| p.cpf == body.cpf || p.email == body.email)
    {
        return message(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Person with cpf or email already exists!",
        );
    }

    let mut next_id = state.next_id.lock().unwrap();
    let mut person = body.into_inner();
    person.id = Some(*next_id);
    *next_id += 1;

    people.push(person.clone());

    HttpResponse::Created().json(person)
}

#[put("/v2/persons/{id}")]
async fn update_v2(
    request: HttpRequest,
    state: Data<BackendState>,
    path: web::Path<u64>,
    body: web::Json<PersonV2>,
) -> impl Responder {
    require_token!(request, state);

    let id = path.into_inner();
    let mut people = state.people.lock().unwrap();

    match people.iter_mut().find(|p| p.id == Some(id)) {
        Some(existing) => {
            *existing = PersonV2 {
                id: Some(id),
                ..body.into_inner()
            };
            HttpResponse::Ok().json(existing.clone())
        }
        None => message(
            actix_web::http::StatusCode::NOT_FOUND,
            &format!("Person with ID {} not found", id),
        ),
    }
}

#[delete("/v2/persons/{id}")]
async fn delete_v2(
    request: HttpRequest,
    state: Data<BackendState>,
    path: web::Path<u64>,
) -> impl Responder {
    require_token!(request, state);

    let id = path.into_inner();
    state.people.lock().unwrap().retain(|p| p.id != Some(id));

    HttpResponse::NoContent().finish()
}

#[get("/persons")]
async fn list_v1(request: HttpRequest, state: Data<BackendState>) -> impl Responder {
    require_token!(request, state);

    let people: Vec<Person> = state.people.lock().unwrap().iter().map(to_v1).collect();

    HttpResponse::Ok().json(people)
}

#[delete("/persons/{id}")]
async fn delete_v1(
    request: HttpRequest,
    state: Data<BackendState>,
    path: web::Path<u64>,
) -> impl Responder {
    require_token!(request, state);

    let id = path.into_inner();
    state.people.lock().unwrap().retain(|p| p.id != Some(id));

    HttpResponse::NoContent().finish()
}

/// In-process stand-in for the REST backend, served from its own actix system thread
pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
    server: actix_web::dev::ServerHandle,
}

impl FakeBackend {
    pub fn start(state: BackendState) -> Self {
        let state = Arc::new(state);
        let server_state = state.clone();
        let (sender, receiver) = mpsc::channel::<(SocketAddr, actix_web::dev::ServerHandle)>();

        thread::spawn(move || {
            actix_web::rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(Data::from(server_state.clone()))
                        .service(login)
                        .service(list_v2)
                        .service(create_v2)
                        .service(update_v2)
                        .service(delete_v2)
                        .service(list_v1)
                        .service(delete_v1)
                })
                .workers(1)
                .bind(("127.0.0.1", 0))
                .expect("fake backend should bind");

                let address = server.addrs()[0];
                let server = server.run();

                sender
                    .send((address, server.handle()))
                    .expect("test should be waiting for the address");

                server.await
            })
        });

        let (address, server) = receiver.recv().expect("fake backend should start");

        Self {
            base_url: format!("http://{}", address),
            state,
            server,
        }
    }

    /// Client wired the same way the binary wires it
    pub fn client(&self, store: Arc<dyn KeyValueStore>, navigator: Navigator) -> ApiClient {
        let options = ClientOptions::default().set_base_url(Some(self.base_url.clone()));

        ApiClient::new(&options)
            .unwrap()
            .with_request_interceptor(Arc::new(BearerToken::new(store.clone())))
            .with_response_interceptor(Arc::new(SessionExpiry::new(store, navigator)))
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        // The stop command is sent eagerly, the system thread winds down on its own
        let _ = self.server.stop(false);
    }
}
