use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// True for a 20-byte hex contract address (`0x` + 40 hex digits).
///
/// Contract and holder addresses are interpolated into GraphQL text, so
/// anything else is rejected before a query is built.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Top holders by balance on `date`, positive balances only.
pub fn top_holders_query(contract: &str, date: NaiveDate, limit: u32) -> String {
    format!(
        r#"
query {{
  EVM(dataset: archive) {{
    TokenHolders(
      tokenSmartContract: "{contract}"
      date: "{date}"
      limit: {{count: {limit}}}
      orderBy: {{descendingByField: "Balance_Amount"}}
      where: {{Balance: {{Amount: {{gt: "0"}}}}}}
    ) {{
      Balance {{ Amount }}
      Holder {{ Address }}
      Currency {{ Name Symbol }}
    }}
  }}
}}"#,
        date = date.format("%Y-%m-%d"),
    )
}

/// Transfers sent by and received by `addresses` since `since`, as two
/// aliased result sets.
pub fn transfers_query(
    addresses: &[String],
    contract: &str,
    since: DateTime<Utc>,
    limit: u32,
) -> String {
    let addresses = serde_json::to_string(addresses).unwrap_or_else(|_| "[]".into());
    let since = since.to_rfc3339_opts(SecondsFormat::Millis, true);
    let selection = r#"{
      Block { Time }
      Transfer {
        Amount
        Sender
        Receiver
        Currency { Symbol }
      }
    }"#;

    format!(
        r#"
query {{
  EVM(dataset: archive) {{
    Transfers(
      where: {{
        Block: {{Time: {{since: "{since}"}}}},
        Transfer: {{
          Currency: {{SmartContract: {{is: "{contract}"}}}},
          Sender: {{in: {addresses}}}
        }}
      }}
      limit: {{count: {limit}}}
      orderBy: {{descending: Block_Time}}
    ) {selection}

    ReceivingTransfers: Transfers(
      where: {{
        Block: {{Time: {{since: "{since}"}}}},
        Transfer: {{
          Currency: {{SmartContract: {{is: "{contract}"}}}},
          Receiver: {{in: {addresses}}}
        }}
      }}
      limit: {{count: {limit}}}
      orderBy: {{descending: Block_Time}}
    ) {selection}
  }}
}}"#
    )
}
