// ==========================================
// 动力电池供应链账本 - 命令行入口
// ==========================================
// 用法:
//   battery-ledger demo                 走通 供应 → 制造 → 运维 → 回收 全流程
//   battery-ledger seed <file.csv>      向原材料供应分区导入种子数据
//   battery-ledger list [partition]     打印分区内的原材料与电池
// 数据目录: BATTERY_LEDGER_DATA_DIR 或用户数据目录
// ==========================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use battery_ledger::api::{CallerIdentity, RegisterMaterialRequest};
use battery_ledger::app::{get_default_data_dir, LedgerNetwork};
use battery_ledger::domain::{MaintenanceEntry, MaintenanceReading, PhysicalAttributes, RawMaterialDetail};
use battery_ledger::engine::ManufactureOrder;
use battery_ledger::importer::MaterialSeedImporter;
use battery_ledger::partition::SyncSource;
use battery_ledger::{logging, MaterialOrigin, PartitionKind};

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let data_dir = get_default_data_dir();
    tracing::info!("{} v{}", battery_ledger::APP_NAME, battery_ledger::VERSION);
    tracing::info!("使用数据目录: {}", data_dir.display());

    let network = LedgerNetwork::open(&data_dir).context("无法打开账本网络")?;

    match args.first().map(String::as_str) {
        Some("demo") | None => run_demo(&network),
        Some("seed") => {
            let path = args.get(1).context("缺少参数: <file.csv>")?;
            run_seed(&network, Path::new(path))
        }
        Some("list") => {
            let partition = args.get(1).map(String::as_str).unwrap_or("material-supply");
            run_list(&network, partition)
        }
        Some(other) => bail!("未知命令: {} (可用: demo / seed / list)", other),
    }
}

fn run_seed(network: &LedgerNetwork, path: &Path) -> Result<()> {
    let node = network.node(PartitionKind::MaterialSupply);
    let importer = MaterialSeedImporter::new(node.inventory.clone());
    let summary = importer
        .import_file(path)
        .with_context(|| format!("导入失败: {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_list(network: &LedgerNetwork, partition: &str) -> Result<()> {
    let kind = PartitionKind::all()
        .into_iter()
        .find(|k| k.default_name() == partition)
        .with_context(|| format!("未知分区: {}", partition))?;

    let materials = network.material_api(kind).query_all_materials()?;
    let batteries = network.battery_api(kind).query_all_batteries()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "partition": partition,
            "materials": materials,
            "batteries": batteries,
        }))?
    );
    Ok(())
}

fn run_demo(network: &LedgerNetwork) -> Result<()> {
    let supplier = CallerIdentity::new("Org1MSP");
    let manufacturer = CallerIdentity::new("Org2MSP");
    let operator = CallerIdentity::new("Org3MSP");
    let maintainer = CallerIdentity::new("Org4MSP");
    let analyst = CallerIdentity::new("Org5MSP");
    let recycler = CallerIdentity::new("Org6MSP");

    // ===== 1. 供应分区登记原材料 =====
    let supply = network.material_api(PartitionKind::MaterialSupply);
    let mut lots = Vec::new();
    for (name, qty) in [("Lithium", 100u64), ("Cobalt", 60), ("Nickel", 80)] {
        let record = supply.register_material(
            &supplier,
            &RegisterMaterialRequest {
                material_id: None,
                supplier_id: "SUP-DEMO".to_string(),
                name: name.to_string(),
                quantity: qty,
            },
        )?;
        lots.push(record);
    }

    // ===== 2. 制造分区同步并制造 =====
    network
        .sync_api(PartitionKind::Manufacturing)
        .sync_materials_from(&SyncSource::of(PartitionKind::MaterialSupply))?;

    let materials: BTreeMap<String, RawMaterialDetail> = lots
        .iter()
        .enumerate()
        .map(|(i, lot)| {
            (
                format!("line-{}", i + 1),
                RawMaterialDetail {
                    material_id: lot.material_id.clone(),
                    material_type: lot.name.clone(),
                    quantity: lot.quantity / 2,
                    status: MaterialOrigin::New,
                },
            )
        })
        .collect();
    let mut recycled = BTreeMap::new();
    recycled.insert(
        "declared-1".to_string(),
        RawMaterialDetail {
            material_id: "EXTERNAL-RECYCLED".to_string(),
            material_type: "Lithium".to_string(),
            quantity: 10,
            status: MaterialOrigin::Recycled,
        },
    );
    let order = ManufactureOrder {
        materials,
        attributes: PhysicalAttributes {
            capacity: 75.0,
            voltage: 400.0,
            weight: 450.0,
            category: "EV".to_string(),
            total_life_cycle: 1500,
            manufacturer_name: "Demo Cells".to_string(),
            location: "Plant-1".to_string(),
        },
        recycled,
        contains_hazardous: true,
    };
    let receipt = network
        .battery_api(PartitionKind::Manufacturing)
        .manufacture(&manufacturer, &order)?;
    let battery_id = receipt.battery_id.clone();
    println!("制造完成: {}", serde_json::to_string_pretty(&receipt)?);

    // ===== 3. 在役更新分区 =====
    let update_sync = network.sync_api(PartitionKind::Update);
    update_sync.sync_batteries_from(&SyncSource::of(PartitionKind::Manufacturing))?;

    let lifecycle = network.lifecycle_api(PartitionKind::Update);
    lifecycle.request_maintenance(&operator, &battery_id)?;
    lifecycle.add_maintenance_log(
        &maintainer,
        &battery_id,
        MaintenanceEntry {
            info: "cell balancing".to_string(),
            maintenance_date: "2026-01-15".to_string(),
            company: "FixCo".to_string(),
        },
        MaintenanceReading::FixedStep,
    )?;
    lifecycle.request_analysis(&operator, &battery_id)?;
    lifecycle.set_recycle_availability(&analyst, &battery_id, true)?;

    // ===== 4. 回收分区拆解 =====
    network
        .sync_api(PartitionKind::Recycle)
        .sync_batteries_from(&SyncSource::of(PartitionKind::Update))?;

    let recycle = network.recycle_api(PartitionKind::Recycle);
    let requested = recycle.estimate_recoverable(&battery_id)?;
    let report = recycle.extract(&recycler, &battery_id, &requested)?;
    println!("拆解完成: {}", serde_json::to_string_pretty(&report)?);

    // ===== 5. 公共视图 =====
    let public_sync = network.sync_api(PartitionKind::Public);
    public_sync.sync_batteries_from(&SyncSource::of(PartitionKind::Recycle))?;
    public_sync.sync_materials_from(&SyncSource::of(PartitionKind::Recycle))?;

    let details = network.battery_api(PartitionKind::Public).battery_details(&battery_id)?;
    println!("公共视图: {}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
