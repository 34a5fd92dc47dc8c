//! Integration tests for the dashboard summaries.

mod common;

use axum::http::StatusCode;
use common::TestClient;

/// Monthly totals match the recorded rows and the balance is their difference.
#[tokio::test]
async fn test_monthly_summary_totals() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;
    client.create_income(&token, 1000.0, "2024-03-01").await;
    client.create_income(&token, 500.0, "2024-02-01").await;
    client.create_expense_in(&token, 1, 120.5, "2024-03-05").await;
    client.create_expense_in(&token, 2, 80.0, "2024-03-06").await;
    client.create_expense_in(&token, 1, 40.0, "2024-02-10").await;

    let (status, body) = client
        .get("/api/dashboard/mensual?mes=3&anio=2024", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalIngresos"], 1000.0);
    assert_eq!(body["totalGastos"], 200.5);
    assert_eq!(body["balanceMes"], 799.5);
    assert_eq!(
        body["balanceMes"].as_f64().unwrap(),
        body["totalIngresos"].as_f64().unwrap() - body["totalGastos"].as_f64().unwrap()
    );
    // All-time: 1500 in, 240.5 out.
    assert_eq!(body["balanceActual"], 1259.5);

    let by_category = body["gastosPorCategoria"].as_array().unwrap();
    assert_eq!(by_category[0]["total"], 120.5);
    assert_eq!(by_category[1]["total"], 80.0);

    let recent = body["ultimosGastos"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0]["fecha"], "2024-03-06");
}

/// Only the five most recent expenses are included.
#[tokio::test]
async fn test_monthly_summary_limits_recent_expenses() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;
    for day in 1..=7 {
        client
            .create_expense(&token, day as f64, &format!("2024-03-0{day}"))
            .await;
    }

    let (_, body) = client
        .get("/api/dashboard/mensual?mes=3&anio=2024", &token)
        .await;
    let recent = body["ultimosGastos"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["fecha"], "2024-03-07");
    assert_eq!(recent[4]["fecha"], "2024-03-03");
}

#[tokio::test]
async fn test_monthly_summary_defaults_to_current_month() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;

    let (status, body) = client.get("/api/dashboard/mensual", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalGastos"], 0.0);
    assert_eq!(body["totalIngresos"], 0.0);
    assert!(body["ultimosGastos"].as_array().unwrap().is_empty());

    let (status, _) = client.get("/api/dashboard/mensual?mes=0", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// The annual summary always has twelve months, zero-filled.
#[tokio::test]
async fn test_annual_summary() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;
    client.create_income(&token, 2000.0, "2024-01-15").await;
    client.create_expense_in(&token, 3, 700.0, "2024-01-20").await;
    client.create_expense_in(&token, 1, 50.0, "2024-06-02").await;
    client.create_expense_in(&token, 1, 25.0, "2024-06-03").await;
    client.create_expense_in(&token, 1, 999.0, "2023-06-03").await;

    let (status, body) = client.get("/api/dashboard/anual?anio=2024", &token).await;
    assert_eq!(status, StatusCode::OK);

    let months = body["resumenPorMes"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[0]["mes"], 1);
    assert_eq!(months[0]["ingresos"], 2000.0);
    assert_eq!(months[0]["gastos"], 700.0);
    assert_eq!(months[5]["gastos"], 75.0);
    assert_eq!(months[5]["ingresos"], 0.0);
    assert_eq!(months[11]["mes"], 12);

    let top = body["topCategorias"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["total"], 700.0);
    assert_eq!(top[1]["total"], 75.0);
    assert_eq!(top[1]["cantidad"], 2);

    assert_eq!(body["totalIngresosAnual"], 2000.0);
    assert_eq!(body["totalGastosAnual"], 775.0);
    assert_eq!(body["balanceAnual"], 1225.0);
}

/// Average daily spending counts only days with expenses.
#[tokio::test]
async fn test_general_statistics() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;
    client.create_expense_in(&token, 1, 10.0, "2024-03-01").await;
    client.create_expense_in(&token, 2, 30.0, "2024-03-09").await;

    let (status, body) = client.get("/api/dashboard/estadisticas", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promedioGastoDiario"], 20.0);
    assert_eq!(body["diaMayorGasto"]["fecha"], "2024-03-09");
    assert_eq!(body["diaMayorGasto"]["total"], 30.0);
    assert_eq!(body["categoriaMayorGasto"]["total"], 30.0);
}

#[tokio::test]
async fn test_general_statistics_without_expenses() {
    let client = TestClient::new();
    let token = client.signup("ana@example.com").await;

    let (status, body) = client.get("/api/dashboard/estadisticas", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promedioGastoDiario"], 0.0);
    assert!(body["diaMayorGasto"].is_null());
    assert!(body["categoriaMayorGasto"].is_null());
}

/// Summaries never include other users' data.
#[tokio::test]
async fn test_dashboard_is_scoped_to_caller() {
    let client = TestClient::new();
    let ana = client.signup("ana@example.com").await;
    let luis = client.signup("luis@example.com").await;
    client.create_expense(&ana, 10.0, "2024-03-01").await;
    client.create_income(&ana, 50.0, "2024-03-01").await;

    let (_, body) = client
        .get("/api/dashboard/mensual?mes=3&anio=2024", &luis)
        .await;
    assert_eq!(body["totalGastos"], 0.0);
    assert_eq!(body["balanceActual"], 0.0);

    let (_, body) = client.get("/api/dashboard/anual?anio=2024", &luis).await;
    assert_eq!(body["totalGastosAnual"], 0.0);
    assert!(body["topCategorias"].as_array().unwrap().is_empty());
}
