#[cfg(feature = "server")]
pub mod http {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::{get, post},
        Router,
    };
    use larder::{
        Engine, LarderError, LineSection, MealType, NutritionReport, RenderState, Restriction,
        RestrictionStatus, Restrictions,
    };
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower_http::cors::CorsLayer;
    use tracing::{error, info};

    type SharedEngine = Arc<RwLock<Engine>>;

    /// Session overrides; anything omitted keeps the fresh-session value
    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RenderRequest {
        #[serde(default)]
        multiplier: Option<f64>,
        #[serde(default)]
        pan_multiplier: Option<f64>,
        #[serde(default)]
        selected_options: HashMap<String, String>,
        #[serde(default)]
        restrictions: Option<Restrictions>,
        #[serde(default)]
        unit_selections: HashMap<String, String>,
        #[serde(default)]
        meal: Option<MealType>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct RenderResponse {
        id: String,
        title: String,
        effective_multiplier: f64,
        ingredients: Vec<LineSection>,
        steps: Vec<LineSection>,
        nutrition: NutritionReport,
        /// The session after resolution, including resolver write-backs
        state: RenderState,
    }

    #[derive(Debug, Serialize)]
    struct RecipeSummary {
        id: String,
        title: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct RestrictionJson {
        restriction: Restriction,
        status: RestrictionStatus,
    }

    #[derive(Debug, Serialize)]
    struct ErrorResponse {
        error: String,
    }

    type ApiError = (StatusCode, Json<ErrorResponse>);

    fn api_error(err: LarderError) -> ApiError {
        let status = match err {
            LarderError::UnknownRecipe(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    }

    pub fn router(engine: Engine) -> Router {
        let shared_engine = Arc::new(RwLock::new(engine));

        Router::new()
            .route("/health", get(health_check))
            .route("/recipes", get(list_recipes))
            .route("/recipes/:id", get(recipe_restrictions))
            .route("/render/:id", post(render_recipe))
            .layer(CorsLayer::permissive())
            .with_state(shared_engine)
    }

    pub async fn start_server(engine: Engine, host: &str, port: u16) -> anyhow::Result<()> {
        let app = router(engine);

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        info!("Larder server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    async fn health_check() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "ok",
            "service": "larder",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }

    async fn list_recipes(State(engine): State<SharedEngine>) -> impl IntoResponse {
        let engine = engine.read().await;
        let recipes: Vec<RecipeSummary> = engine
            .list_recipes()
            .into_iter()
            .filter_map(|id| {
                let title = engine.get_recipe(&id).ok()?.title.clone();
                Some(RecipeSummary { id, title })
            })
            .collect();
        Json(recipes)
    }

    async fn recipe_restrictions(
        State(engine): State<SharedEngine>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let engine = engine.read().await;
        let statuses: Vec<RestrictionJson> = engine
            .restriction_statuses(&id)
            .map_err(api_error)?
            .into_iter()
            .map(|(restriction, status)| RestrictionJson {
                restriction,
                status,
            })
            .collect();
        Ok(Json(statuses))
    }

    async fn render_recipe(
        State(engine): State<SharedEngine>,
        Path(id): Path<String>,
        Json(request): Json<RenderRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let engine = engine.read().await;

        let mut state = engine.new_session(&id).map_err(api_error)?;
        if let Some(multiplier) = request.multiplier {
            state.multiplier = multiplier;
        }
        if let Some(pan_multiplier) = request.pan_multiplier {
            state.pan_multiplier = pan_multiplier;
        }
        if let Some(restrictions) = request.restrictions {
            state.restrictions = restrictions;
        }
        state.selected_options.extend(request.selected_options);
        state.unit_selections.extend(request.unit_selections);

        if !(state.effective_multiplier().is_finite() && state.effective_multiplier() > 0.0) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "multiplier and panMultiplier must be positive".to_string(),
                }),
            ));
        }

        let rendered = engine.render(&id, &mut state).map_err(|e| {
            error!("Rendering '{}' failed: {}", id, e);
            api_error(e)
        })?;
        let meal = request.meal.unwrap_or(MealType::Dinner);
        let nutrition = engine
            .nutrition_report(&id, &mut state, meal)
            .map_err(api_error)?;

        info!(
            "Rendered recipe '{}' at x{} for {}",
            id,
            rendered.effective_multiplier,
            meal
        );

        Ok(Json(RenderResponse {
            id: rendered.id,
            title: rendered.title,
            effective_multiplier: rendered.effective_multiplier,
            ingredients: rendered.ingredients,
            steps: rendered.steps,
            nutrition,
            state,
        }))
    }

}

#[cfg(not(feature = "server"))]
pub mod http {
    pub async fn start_server(
        _engine: larder::Engine,
        _host: &str,
        _port: u16,
    ) -> anyhow::Result<()> {
        anyhow::bail!("Server feature not enabled. Recompile with --features server")
    }
}
