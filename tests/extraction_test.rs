// ==========================================
// ExtractionEngine 集成测试
// ==========================================
// 测试范围:
// 1. 未判定可回收时拒绝 NotRecyclable
// 2. 拆解: 电池置为终态，生成 RECYCLED 原材料记录
// 3. 提取记录查询
// 4. 只处理电池中存在、声明数量 > 0 的类型
// 5. 提取率估算（只读）
// 6. JSON 载荷与角色校验
// ==========================================


#[cfg(test)]
mod extraction_test {
    use battery_ledger::api::ApiError;
    use battery_ledger::engine::EngineError;
    use battery_ledger::partition::PartitionNode;
    use battery_ledger::{Availability, BatteryStatus, MaterialOrigin, PartitionKind, VerificationMark};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    use crate::test_helpers::{
        analyst, create_test_network, create_test_node, manufacturer, operator, recycler,
        sample_order,
    };

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn setup_battery() -> (NamedTempFile, Arc<PartitionNode>, String) {
        let (temp, node) = create_test_node(PartitionKind::Recycle).expect("无法创建测试环境");
        node.inventory.register("M1", "SUP-A", "Lithium", 100).unwrap();
        node.inventory.register("M2", "SUP-A", "Cobalt", 50).unwrap();
        let receipt = node
            .manufacturing
            .manufacture(&sample_order(&[("M1", "Lithium", 40), ("M2", "Cobalt", 20)]))
            .unwrap();
        (temp, node, receipt.battery_id)
    }

    fn mark_recyclable(node: &PartitionNode, battery_id: &str) {
        node.lifecycle.request_analysis(battery_id).unwrap();
        node.lifecycle.set_recycle_availability(battery_id, true).unwrap();
    }

    fn quantities(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    // ==========================================
    // 前置条件
    // ==========================================

    #[test]
    fn test_extract_未判定可回收时拒绝() {
        let (_temp, node, battery_id) = setup_battery();
        let before = node.inventory.query_all().unwrap().len();

        let err = node
            .extraction
            .extract(&battery_id, &quantities(&[("Lithium", 10)]))
            .unwrap_err();

        assert!(matches!(err, EngineError::NotRecyclable { battery_id: ref id } if id == &battery_id));
        let battery = node.queries.query_battery(&battery_id).unwrap();
        assert_eq!(battery.status, BatteryStatus::Original);
        assert_eq!(node.inventory.query_all().unwrap().len(), before);
        assert!(matches!(
            node.extraction.query_extraction(&battery_id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_extract_电池不存在() {
        let (_temp, node) = create_test_node(PartitionKind::Recycle).expect("无法创建测试环境");

        let err = node
            .extraction
            .extract("BATTERY-missing", &quantities(&[("Lithium", 1)]))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "Battery", .. }));
    }

    // ==========================================
    // 拆解
    // ==========================================

    #[test]
    fn test_extract_生成回收原材料并置为终态() {
        let (_temp, node, battery_id) = setup_battery();
        mark_recyclable(&node, &battery_id);

        let report = node
            .extraction
            .extract(&battery_id, &quantities(&[("Lithium", 12), ("Cobalt", 6)]))
            .unwrap();

        assert_eq!(report.battery_id, battery_id);
        assert_eq!(report.materials.len(), 2);

        let lithium = &report.materials["Lithium"];
        assert!(lithium.material_id.starts_with("MATERIAL-"));
        assert_eq!(lithium.quantity, 12);
        assert_eq!(lithium.status, MaterialOrigin::Recycled);

        let record = node.inventory.query(&lithium.material_id).unwrap();
        assert_eq!(record.name, "Lithium");
        assert_eq!(record.quantity, 12);
        assert_eq!(record.origin, MaterialOrigin::Recycled);
        assert_eq!(record.availability, Availability::Available);
        assert_eq!(record.verified, VerificationMark::NotVerified);
        assert_eq!(record.supplier_id, "recycle-source");

        let battery = node.queries.query_battery(&battery_id).unwrap();
        assert_eq!(battery.status, BatteryStatus::Disassembled);

        let catalog = node.inventory.catalog().unwrap();
        assert_eq!(catalog.recycled_materials.len(), 2);

        let stored = node.extraction.query_extraction(&battery_id).unwrap();
        assert_eq!(stored, report);
    }

    #[test]
    fn test_extract_重复拆解拒绝() {
        let (_temp, node, battery_id) = setup_battery();
        mark_recyclable(&node, &battery_id);
        node.extraction
            .extract(&battery_id, &quantities(&[("Lithium", 12)]))
            .unwrap();
        let count = node.inventory.query_all().unwrap().len();

        let err = node
            .extraction
            .extract(&battery_id, &quantities(&[("Lithium", 12)]))
            .unwrap_err();

        assert!(matches!(err, EngineError::PreconditionFailed { .. }));
        assert_eq!(node.inventory.query_all().unwrap().len(), count);
    }

    #[test]
    fn test_extract_忽略不含类型与零数量() {
        let (_temp, node, battery_id) = setup_battery();
        mark_recyclable(&node, &battery_id);

        let report = node
            .extraction
            .extract(
                &battery_id,
                &quantities(&[("Lithium", 8), ("Cobalt", 0), ("Unobtainium", 99)]),
            )
            .unwrap();

        assert_eq!(report.materials.keys().collect::<Vec<_>>(), vec!["Lithium"]);
        assert_eq!(
            node.queries.query_battery(&battery_id).unwrap().status,
            BatteryStatus::Disassembled
        );
    }

    #[test]
    fn test_extract_超出电池含量时照常记录() {
        let (_temp, node, battery_id) = setup_battery();
        mark_recyclable(&node, &battery_id);

        let report = node
            .extraction
            .extract(&battery_id, &quantities(&[("Cobalt", 500)]))
            .unwrap();

        assert_eq!(report.materials["Cobalt"].quantity, 500);
    }

    // ==========================================
    // 估算
    // ==========================================

    #[test]
    fn test_estimate_recoverable_按提取率向下取整() {
        let (_temp, node, battery_id) = setup_battery();

        let estimate = node.extraction.estimate_recoverable(&battery_id).unwrap();

        // Lithium 40 × 0.30 = 12, Cobalt 20 × 0.20 = 4
        assert_eq!(estimate, quantities(&[("Cobalt", 4), ("Lithium", 12)]));
        // 只读，电池不变
        assert_eq!(
            node.queries.query_battery(&battery_id).unwrap().status,
            BatteryStatus::Original
        );
    }

    // ==========================================
    // API 层
    // ==========================================

    #[test]
    fn test_recycle_api_角色与载荷() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        let node = network.node(PartitionKind::Recycle);
        node.inventory.register("M1", "SUP-A", "Lithium", 100).unwrap();
        let battery_id = network
            .battery_api(PartitionKind::Recycle)
            .manufacture(&manufacturer(), &sample_order(&[("M1", "Lithium", 40)]))
            .unwrap()
            .battery_id;

        let lifecycle = network.lifecycle_api(PartitionKind::Recycle);
        lifecycle.request_analysis(&operator(), &battery_id).unwrap();
        lifecycle.set_recycle_availability(&analyst(), &battery_id, true).unwrap();

        let api = network.recycle_api(PartitionKind::Recycle);
        assert!(matches!(
            api.extract_json(&operator(), &battery_id, r#"{"Lithium": 5}"#),
            Err(ApiError::PermissionDenied { .. })
        ));
        assert!(matches!(
            api.extract_json(&recycler(), &battery_id, r#"{"Lithium": -5}"#),
            Err(ApiError::MalformedInput(_))
        ));

        let report = api
            .extract_json(&recycler(), &battery_id, r#"{"Lithium": 5}"#)
            .unwrap();
        assert_eq!(report.materials["Lithium"].quantity, 5);
        assert_eq!(api.query_extraction(&battery_id).unwrap(), report);

        assert!(matches!(
            api.extract(&recycler(), &battery_id, &quantities(&[("Lithium", 5)])),
            Err(ApiError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_recycle_api_不可回收错误() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        network
            .node(PartitionKind::Recycle)
            .inventory
            .register("M1", "SUP-A", "Lithium", 100)
            .unwrap();
        let battery_id = network
            .battery_api(PartitionKind::Recycle)
            .manufacture(&manufacturer(), &sample_order(&[("M1", "Lithium", 40)]))
            .unwrap()
            .battery_id;

        let err = network
            .recycle_api(PartitionKind::Recycle)
            .extract(&recycler(), &battery_id, &quantities(&[("Lithium", 5)]))
            .unwrap_err();

        match err {
            ApiError::NotRecyclable(id) => assert_eq!(id, battery_id),
            other => panic!("意外错误: {}", other),
        }
    }
}
