pub mod mock_org_node;
