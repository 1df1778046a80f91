use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, put, web};

use serde::Deserialize;

use rs_markov_core::io::{get_filename, list_files};
use rs_markov_core::model::trigram_model::TrigramModel;

/// Directory containing serialized model files.
const MODEL_DIR: &str = "./data";

/// Upper bound on words returned by a single request.
const MAX_WORDS: usize = 10_000;

/// Query parameters for the `/v1/generate` endpoint.
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
	refresh_limit: Option<u32>,
	seed_first: Option<String>,
	seed_second: Option<String>,
}

/// Query parameters for the `/v1/load_model` endpoint.
#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	model: TrigramModel,
	model_name: String,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sequence of words from the loaded model. Optional
/// `seed_first`/`seed_second` preset the generation context so the output
/// continues an existing pair of words.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let count = query.count.unwrap_or(100).min(MAX_WORDS);
	let refresh_limit = query.refresh_limit.unwrap_or(15);

	let seed = match (&query.seed_first, &query.seed_second) {
		(Some(first), Some(second)) => Some((first.clone(), second.clone())),
		(None, None) => None,
		_ => {
			return HttpResponse::BadRequest()
				.body("seed_first and seed_second must be provided together");
		}
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let mut generator = match shared_data.model.output_generator(refresh_limit) {
		Ok(g) => g,
		Err(e) => return HttpResponse::InternalServerError().body(e),
	};
	if let Some((first, second)) = &seed {
		generator.seed_context(first, second);
	}

	let words: Vec<String> = (0..count).map(|_| generator.generate_word()).collect();
	HttpResponse::Ok().body(words.join(" "))
}

/// HTTP GET endpoint `/v1/models`
///
/// Lists the model files available for loading.
#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files(MODEL_DIR, "bin") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".bin", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

/// HTTP GET endpoint `/v1/loaded_model`
///
/// Reports the currently loaded model and its vocabulary size.
#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(format!(
		"{} ({} words)",
		shared_data.model_name,
		shared_data.model.vocabulary_size()
	))
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Replaces the loaded model with a named model file from the data
/// directory.
#[put("/v1/load_model")]
async fn put_model(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<ModelQuery>,
) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let model_path = format!("{MODEL_DIR}/{name}.bin");
	let model = match TrigramModel::load(&model_path) {
		Ok(m) => m,
		Err(e) => {
			return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"));
		}
	};
	if !model.is_finished() {
		return HttpResponse::InternalServerError().body("Model file was not finalized");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model = model;
	shared_data.model_name = get_filename(&model_path).unwrap_or_else(|_| name.to_owned());

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Starts with an empty model; `/v1/load_model` swaps in a trained one.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Model files are read from `./data` and produced by the CLI's `--cache`
///   flag (or `TrigramModel::save`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let shared_data = SharedData {
		model: TrigramModel::new(),
		model_name: "none".to_owned(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.service(get_generated)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_model)
	})
	.bind(("127.0.0.1", 5000))?
	.run()
	.await
}
