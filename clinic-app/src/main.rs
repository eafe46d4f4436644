//! 诊所应用主程序

use anyhow::{Context, Result};
use clap::Parser;
use clinic_admin::{init_logging, ConfigManager};
use clinic_core::{AppointmentType, TimeSlot};
use clinic_records::views::dashboard_stats;
use clinic_records::ClinicalRecords;
use clinic_service::{ClinicService, LatencySettings};
use clinic_session::{Actor, FileSessionStorage, SessionStore};
use tracing::info;

/// 诊所应用命令行参数
#[derive(Parser, Debug)]
#[command(name = "clinic-app")]
#[command(about = "诊所预约与病历管理")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 会话文件目录，覆盖配置文件
    #[arg(short, long)]
    session_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut manager = ConfigManager::load(args.config.as_deref())?;
    let mut config = manager.config().clone();
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(dir) = args.session_dir {
        config.session.storage_dir = dir;
    }
    manager
        .update_config(config)
        .context("Invalid command line overrides")?;
    let config = manager.config();

    init_logging(&config.logging.level)?;
    info!("启动诊所应用...");
    info!("配置文件: {}", manager.config_path().unwrap_or("(默认)"));

    let storage = FileSessionStorage::new(&config.session.storage_dir);
    let session = SessionStore::restore_with_key(storage, &config.session.storage_key);

    let records = if config.records.load_seed_data {
        ClinicalRecords::seeded()
    } else {
        ClinicalRecords::default()
    };

    let latency = LatencySettings::from_millis(
        config.latency.login_ms,
        config.latency.registration_ms,
        config.latency.booking_ms,
    );
    let service = ClinicService::new(session, records, latency);

    match service.actor() {
        Actor::Anonymous => info!("当前会话: 未登录"),
        Actor::Patient(patient) => info!("当前会话: 患者 {} ({})", patient.name, patient.id),
        Actor::Doctor(doctor) => info!("当前会话: 医生 {} ({})", doctor.name, doctor.specialization),
    }

    let stats = dashboard_stats(service.records().patients());
    info!("诊所概况:");
    info!("  患者总数: {}", stats.total_patients);
    info!("  预约总数: {}", stats.total_appointments);
    info!("  待就诊患者: {}", stats.patients_with_scheduled);
    info!("  已完成就诊: {}", stats.completed_appointments);

    info!("医生名录:");
    for doctor in service.doctors() {
        let days: Vec<String> = doctor.availability.iter().map(|w| w.day.to_string()).collect();
        info!(
            "  {} - {} ({} 年, ₹{}) {}",
            doctor.name,
            doctor.specialization,
            doctor.experience_years,
            doctor.consultation_fee,
            days.join("/")
        );
    }

    let slots: Vec<&str> = TimeSlot::all().map(|slot| slot.as_str()).collect();
    let types: Vec<&str> = AppointmentType::all().iter().map(|t| t.label()).collect();
    info!("可预约时段: {}", slots.join(", "));
    info!("预约类型: {}", types.join(", "));

    Ok(())
}
