use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use log::{error, info};
use serde::Deserialize;
use markov_gen_core::export::edges_csv_string;
use markov_gen_core::io::{list_files, load_or_train};
use markov_gen_core::stats::GraphStats;
use markov_gen_core::{DeadEndPolicy, GenerationConfig, MarkovError, MarkovModel, StartState};

/// Folder holding the `.txt` corpora (and their `.bin` caches).
const DATA_FOLDER: &str = "./data";

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	target_length: Option<usize>,
	max_steps: Option<usize>,
	dead_end: Option<DeadEndPolicy>,
	seed: Option<u64>,
	start: Option<String> // -> "random" or "custom:<n tokens>"
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
	n: Option<usize>
}

#[derive(Deserialize)]
struct TopQuery {
	k: Option<usize>
}

struct LoadedModel {
	name: String,
	model: Arc<MarkovModel>
}

/// The model currently served. Replaced as a whole by `/v1/load_model`;
/// generation only clones the `Arc` and never holds the lock while sampling.
#[derive(Default)]
struct SharedData {
	loaded: Option<LoadedModel>
}

impl GenerateParams {
	/// Determines the start state strategy for generation.
	fn start_state(&self) -> Result<StartState, String> {
		match &self.start {
			None => Ok(StartState::Random),
			Some(s) if s.to_lowercase() == "random" => Ok(StartState::Random),
			Some(s) if s.to_lowercase().starts_with("custom:") => {
				let value = &s["custom:".len()..];
				if value.trim().is_empty() {
					Err("Custom start cannot be empty".into())
				} else {
					Ok(StartState::Custom(value.to_owned()))
				}
			}
			Some(_) => Err("Start must be 'random' or start with 'custom:'".into()),
		}
	}

	fn config(&self) -> GenerationConfig {
		let defaults = GenerationConfig::default();
		GenerationConfig {
			target_length: self.target_length.unwrap_or(defaults.target_length),
			max_steps: self.max_steps.unwrap_or(defaults.max_steps),
			dead_end: self.dead_end.unwrap_or(defaults.dead_end),
			seed: self.seed,
		}
	}
}

/// Maps a library error onto an HTTP response.
///
/// - bad parameters (including an exhausted step cap) → 400
/// - dead end with the `fail` policy → 409
/// - anything else → 500
fn error_response(e: &MarkovError) -> HttpResponse {
	match e {
		MarkovError::InvalidArgument { .. } | MarkovError::StepLimit { .. } => HttpResponse::BadRequest().body(e.to_string()),
		MarkovError::DeadEnd { .. } => HttpResponse::Conflict().body(e.to_string()),
		_ => {
			error!("{e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// Maps a failed `/v1/load_model` onto an HTTP response.
///
/// A missing corpus file is a 404; other errors follow `error_response`.
fn load_error_response(e: &MarkovError) -> HttpResponse {
	match e {
		MarkovError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
			HttpResponse::NotFound().body(format!("Failed to load corpus: {io}"))
		}
		_ => error_response(e),
	}
}

/// Returns the served model, or the response to send if there is none.
fn current_model(data: &RwLock<SharedData>) -> Result<Arc<MarkovModel>, HttpResponse> {
	let shared_data = data.read().map_err(|_| HttpResponse::InternalServerError().body("Model lock failed"))?;
	match &shared_data.loaded {
		Some(loaded) => Ok(Arc::clone(&loaded.model)),
		None => Err(HttpResponse::NotFound().body("No model loaded, use PUT /v1/load_model")),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates text from the loaded model based on query parameters.
/// Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let start = match query.start_state() {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};
	let config = query.config();

	let model = match current_model(&data) {
		Ok(m) => m,
		Err(response) => return response
	};

	match web::block(move || model.generate(&start, config)).await {
		Ok(Ok(generation)) => HttpResponse::Ok().body(generation.text().to_owned()),
		Ok(Err(e)) => error_response(&e),
		Err(e) => HttpResponse::InternalServerError().body(format!("Generation failed: {e}")),
	}
}

#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files(DATA_FOLDER, "txt") {
		Ok(files) => {
			let names: Vec<&str> = files.iter().map(|f| f.trim_end_matches(".txt")).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora")
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.loaded {
		Some(loaded) => HttpResponse::Ok().body(format!("{} (n = {})", loaded.name, loaded.model.n())),
		None => HttpResponse::Ok().body(""),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	match current_model(&data) {
		Ok(model) => HttpResponse::Ok().json(GraphStats::compute(model.graph())),
		Err(response) => response
	}
}

#[get("/v1/top")]
async fn get_top(data: web::Data<RwLock<SharedData>>, query: web::Query<TopQuery>) -> impl Responder {
	let model = match current_model(&data) {
		Ok(m) => m,
		Err(response) => return response
	};
	let lines: Vec<String> = model
		.most_common(query.k.unwrap_or(5))
		.into_iter()
		.map(|(ngram, count)| format!("{ngram}\t{count}"))
		.collect();
	HttpResponse::Ok().body(lines.join("\n"))
}

#[get("/v1/edges")]
async fn get_edges(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let model = match current_model(&data) {
		Ok(m) => m,
		Err(response) => return response
	};
	match edges_csv_string(&model) {
		Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
		Err(e) => error_response(&e),
	}
}

#[put("/v1/load_model")]
async fn put_model(data: web::Data<RwLock<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};
	if name.contains(['/', '\\']) || name.contains("..") {
		return HttpResponse::BadRequest().body("Corpus name must not contain a path");
	}
	let n = query.n.unwrap_or(2);

	let corpus_path = PathBuf::from(DATA_FOLDER).join(format!("{name}.txt"));
	let model = match web::block(move || load_or_train(corpus_path, n, true)).await {
		Ok(Ok(m)) => m,
		Ok(Err(e)) => return load_error_response(&e),
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	info!("Serving {name} (n = {n})");
	shared_data.loaded = Some(LoadedModel { name, model: Arc::new(model) });

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Starts with no model; one is trained (or read from its cache) by
/// `PUT /v1/load_model` and then shared read-only by every worker.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000 with one worker per core.
/// - Corpora are read from `./data/<name>.txt`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let shared_data = web::Data::new(RwLock::new(SharedData::default()));

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(get_loaded_model)
			.service(get_stats)
			.service(get_top)
			.service(get_edges)
			.service(put_model)
	})
		.workers(num_cpus::get())
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn serving(corpus: &str, n: usize) -> web::Data<RwLock<SharedData>> {
		let model = MarkovModel::train(corpus, n).unwrap();
		web::Data::new(RwLock::new(SharedData {
			loaded: Some(LoadedModel { name: "test".to_owned(), model: Arc::new(model) })
		}))
	}

	fn params(start: Option<&str>) -> GenerateParams {
		GenerateParams { target_length: None, max_steps: None, dead_end: None, seed: None, start: start.map(str::to_owned) }
	}

	#[::core::prelude::v1::test]
	fn parses_start_parameter() {
		assert_eq!(params(None).start_state(), Ok(StartState::Random));
		assert_eq!(params(Some("RANDOM")).start_state(), Ok(StartState::Random));
		assert_eq!(params(Some("custom:the cat")).start_state(), Ok(StartState::Custom("the cat".to_owned())));
		assert!(params(Some("custom: ")).start_state().is_err());
		assert!(params(Some("first")).start_state().is_err());
	}

	#[actix_web::test]
	async fn generate_without_model_is_not_found() {
		let shared_data = web::Data::new(RwLock::new(SharedData::default()));
		let app = test::init_service(App::new().app_data(shared_data).service(get_generated)).await;
		let response = test::call_service(&app, test::TestRequest::get().uri("/v1/generate").to_request()).await;
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn generates_from_loaded_model() {
		let model = MarkovModel::train("the cat sat. the dog sat.", 2).unwrap();
		let shared_data = web::Data::new(RwLock::new(SharedData {
			loaded: Some(LoadedModel { name: "animals".to_owned(), model: Arc::new(model) })
		}));
		let app = test::init_service(App::new().app_data(shared_data).service(get_generated).service(get_stats)).await;

		let request = test::TestRequest::get().uri("/v1/generate?start=custom:the%20cat&target_length=3").to_request();
		let body = test::call_and_read_body(&app, request).await;
		assert_eq!(body, "the cat sat.");

		let request = test::TestRequest::get().uri("/v1/generate?start=custom:the").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let request = test::TestRequest::get().uri("/v1/generate?target_length=0").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let request = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(stats["edges"], 6);
	}

	#[actix_web::test]
	async fn dead_end_policy_selects_the_response() {
		let app = test::init_service(App::new().app_data(serving("a b c", 1)).service(get_generated)).await;

		let request = test::TestRequest::get().uri("/v1/generate?start=custom:b&target_length=5&dead_end=stop").to_request();
		let body = test::call_and_read_body(&app, request).await;
		assert_eq!(body, "b c");

		let request = test::TestRequest::get().uri("/v1/generate?start=custom:b&target_length=5&dead_end=fail").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::CONFLICT);

		let request = test::TestRequest::get().uri("/v1/generate?start=custom:b&target_length=5&dead_end=restart&seed=4").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);

		let request = test::TestRequest::get().uri("/v1/generate?dead_end=sometimes").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn exhausted_step_cap_is_a_bad_request() {
		let app = test::init_service(App::new().app_data(serving("a a a a", 1)).service(get_generated)).await;
		let request = test::TestRequest::get().uri("/v1/generate?target_length=50&max_steps=5").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[::core::prelude::v1::test]
	fn only_missing_corpora_are_not_found() {
		use std::io::{Error, ErrorKind};

		let missing = MarkovError::Io(Error::from(ErrorKind::NotFound));
		assert_eq!(load_error_response(&missing).status(), StatusCode::NOT_FOUND);
		let read_only = MarkovError::Io(Error::from(ErrorKind::PermissionDenied));
		assert_eq!(load_error_response(&read_only).status(), StatusCode::INTERNAL_SERVER_ERROR);
		let empty = MarkovError::InvalidArgument { argument: "corpus", reason: "must not be empty".to_owned() };
		assert_eq!(load_error_response(&empty).status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn loading_an_unknown_corpus_is_not_found() {
		let shared_data = web::Data::new(RwLock::new(SharedData::default()));
		let app = test::init_service(App::new().app_data(shared_data).service(put_model)).await;
		let request = test::TestRequest::put().uri("/v1/load_model?name=no_such_corpus&n=2").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}
}
