use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

const CHECKPOINTS: [&str; 4] = ["Toll Plaza A", "Toll Plaza B", "Toll Plaza C", "Toll Plaza D"];

#[derive(Clone)]
struct Settings {
    base_url: String,
    scanner_token: String,
    scanner_id: String,
}

impl Settings {
    fn from_env() -> Self {
        Self {
            base_url: std::env::var("TOLL_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            scanner_token: std::env::var("SCANNER_TOKEN").unwrap_or_default(),
            scanner_id: std::env::var("SCANNER_ID").unwrap_or_else(|_| "SCN-SIM-01".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScanReply {
    license_plate: String,
    checkpoint: String,
    toll_amount: String,
    previous_balance: String,
    new_balance: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🛣️  Toll Scanner Simulator".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());

    let settings = Settings::from_env();
    if settings.scanner_token.is_empty() {
        println!("{}", "⚠️  SCANNER_TOKEN vacío: el backend rechazará los escaneos (401)".bright_yellow());
    }
    println!("🌐 Backend: {}", settings.base_url);
    println!("📟 Lector: {}", settings.scanner_id);

    let client = Client::new();

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🚗 Enviar un escaneo");
        println!("2. 🚦 Ráfaga de escaneos concurrentes (misma etiqueta)");
        println!("3. 💓 Enviar heartbeat");
        println!("4. 📡 Ver lectores registrados");
        println!("5. 🚪 Salir");

        match prompt("Selecciona una opción (1-5): ")?.as_str() {
            "1" => {
                let rfid = prompt("Etiqueta RFID: ")?;
                let checkpoint = pick_checkpoint()?;
                send_scan(&client, &settings, &rfid, &checkpoint).await?;
            }
            "2" => {
                let rfid = prompt("Etiqueta RFID: ")?;
                let checkpoint = pick_checkpoint()?;
                let count: usize = prompt("Número de escaneos: ")?.parse().unwrap_or(10);
                burst(&client, &settings, &rfid, &checkpoint, count).await?;
            }
            "3" => heartbeat(&client, &settings).await?,
            "4" => list_scanners(&client, &settings).await?,
            "5" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn pick_checkpoint() -> Result<String> {
    for (i, name) in CHECKPOINTS.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }
    let choice = prompt("Checkpoint (1-4, o nombre libre): ")?;
    Ok(match choice.parse::<usize>() {
        Ok(n) if (1..=CHECKPOINTS.len()).contains(&n) => CHECKPOINTS[n - 1].to_string(),
        _ => choice,
    })
}

async fn post_scan(client: &Client, settings: &Settings, rfid: &str, checkpoint: &str) -> Result<(StatusCode, Value)> {
    let response = client
        .post(format!("{}/api/toll/rfid-scan", settings.base_url))
        .header("X-Scanner-Token", &settings.scanner_token)
        .json(&json!({
            "rfid": rfid,
            "checkpoint": checkpoint,
            "scanner_id": settings.scanner_id,
        }))
        .send()
        .await
        .context("backend unreachable")?;
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

async fn send_scan(client: &Client, settings: &Settings, rfid: &str, checkpoint: &str) -> Result<()> {
    let started = Instant::now();
    let (status, body) = post_scan(client, settings, rfid, checkpoint).await?;
    let elapsed = started.elapsed();

    if status.is_success() {
        let reply: ScanReply = serde_json::from_value(body)?;
        println!("{}", format!("✅ {} ({:?})", status, elapsed).bright_green().bold());
        println!("   🚗 {} en {}", reply.license_plate, reply.checkpoint);
        println!(
            "   💰 {} - {} = {}",
            reply.previous_balance, reply.toll_amount, reply.new_balance
        );
    } else {
        println!("{}", format!("❌ {} ({:?})", status, elapsed).bright_red().bold());
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}

async fn burst(client: &Client, settings: &Settings, rfid: &str, checkpoint: &str, count: usize) -> Result<()> {
    println!("{}", format!("🚦 Enviando {} escaneos en paralelo...", count).bright_cyan());

    let mut handles = Vec::with_capacity(count);
    for _ in 0..count {
        let client = client.clone();
        let settings = settings.clone();
        let (rfid, checkpoint) = (rfid.to_string(), checkpoint.to_string());
        handles.push(tokio::spawn(async move {
            post_scan(&client, &settings, &rfid, &checkpoint).await
        }));
    }

    let mut tally: Vec<(StatusCode, usize)> = Vec::new();
    for handle in handles {
        let (status, _) = handle.await??;
        match tally.iter_mut().find(|(s, _)| *s == status) {
            Some((_, n)) => *n += 1,
            None => tally.push((status, 1)),
        }
    }

    for (status, n) in tally {
        let line = format!("   {} x {}", n, status);
        if status.is_success() {
            println!("{}", line.bright_green());
        } else {
            println!("{}", line.bright_red());
        }
    }
    Ok(())
}

async fn heartbeat(client: &Client, settings: &Settings) -> Result<()> {
    let body: Value = client
        .post(format!("{}/api/scanner/heartbeat", settings.base_url))
        .json(&json!({ "scanner_id": settings.scanner_id, "status": "online" }))
        .send()
        .await
        .context("backend unreachable")?
        .json()
        .await?;
    println!("{} {}", "💓".bright_magenta(), body["server_time"]);
    Ok(())
}

async fn list_scanners(client: &Client, settings: &Settings) -> Result<()> {
    let body: Value = client
        .get(format!("{}/api/admin/scanners", settings.base_url))
        .send()
        .await
        .context("backend unreachable")?
        .json()
        .await?;
    let scanners = body["data"].as_array().cloned().unwrap_or_default();
    if scanners.is_empty() {
        println!("{}", "📡 Ningún lector registrado".bright_yellow());
    }
    for scanner in scanners {
        println!(
            "   📡 {} [{}] visto {}",
            scanner["scanner_id"].as_str().unwrap_or("?"),
            scanner["status"].as_str().unwrap_or("?"),
            scanner["last_seen"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}
