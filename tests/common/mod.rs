//! Synthetic FCS buffers for integration tests.

#![allow(dead_code)]

use fcs_rs::segments::join_tokens;

/// Route decoder logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds an in-memory FCS dataset: header, TEXT, optional ANALYSIS, DATA.
pub struct FcsBuilder {
    version: &'static str,
    delimiter: char,
    keywords: Vec<(String, String)>,
    analysis: Vec<(String, String)>,
    data: Vec<u8>,
    data_end_delta: i64,
    offsets_in_text: bool,
    prefix: Vec<u8>,
}

impl Default for FcsBuilder {
    fn default() -> Self {
        Self {
            version: "3.1",
            delimiter: '/',
            keywords: Vec::new(),
            analysis: Vec::new(),
            data: Vec::new(),
            data_end_delta: 0,
            offsets_in_text: false,
            prefix: Vec::new(),
        }
    }
}

impl FcsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn keyword(mut self, key: &str, value: &str) -> Self {
        self.keywords.push((key.to_string(), value.to_string()));
        self
    }

    pub fn analysis_keyword(mut self, key: &str, value: &str) -> Self {
        self.analysis.push((key.to_string(), value.to_string()));
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Shift the declared DATA end offset, e.g. `1` for an exclusive end.
    pub fn data_end_delta(mut self, delta: i64) -> Self {
        self.data_end_delta = delta;
        self
    }

    /// Write `$BEGINDATA`/`$ENDDATA` into TEXT and zeros into the header.
    pub fn offsets_in_text(mut self) -> Self {
        self.offsets_in_text = true;
        self
    }

    /// Bytes placed before the header, for datasets at a nonzero offset.
    pub fn prefix(mut self, prefix: Vec<u8>) -> Self {
        self.prefix = prefix;
        self
    }

    fn segment(&self, pairs: &[(String, String)]) -> Vec<u8> {
        let tokens: Vec<&str> = pairs
            .iter()
            .flat_map(|(k, v)| [k.as_str(), v.as_str()])
            .collect();
        join_tokens(&tokens, self.delimiter).into_bytes()
    }

    pub fn build(self) -> Vec<u8> {
        let mut keywords = self.keywords.clone();
        if self.offsets_in_text {
            // Fixed width placeholders so the TEXT length does not depend on them
            keywords.push(("$BEGINDATA".into(), format!("{:020}", 0)));
            keywords.push(("$ENDDATA".into(), format!("{:020}", 0)));
        }

        let text_start = 58u64;
        let text_len = self.segment(&keywords).len() as u64;
        let text_stop = text_start + text_len - 1;

        let analysis_bytes = if self.analysis.is_empty() {
            Vec::new()
        } else {
            self.segment(&self.analysis)
        };
        let (analysis_start, analysis_stop) = if analysis_bytes.is_empty() {
            (0, 0)
        } else {
            (text_stop + 1, text_stop + analysis_bytes.len() as u64)
        };

        let data_start = text_stop + 1 + analysis_bytes.len() as u64;
        let data_end = if self.data.is_empty() {
            data_start
        } else {
            data_start + self.data.len() as u64 - 1
        };
        let data_end = (data_end as i64 + self.data_end_delta) as u64;

        if self.offsets_in_text {
            let n = keywords.len();
            keywords[n - 2].1 = format!("{data_start:020}");
            keywords[n - 1].1 = format!("{data_end:020}");
        }
        let text = self.segment(&keywords);
        assert_eq!(text.len() as u64, text_len);

        let (header_data_start, header_data_end) = if self.offsets_in_text {
            (0, 0)
        } else {
            (data_start, data_end)
        };

        let mut out = self.prefix.clone();
        out.extend_from_slice(format!("FCS{:<3}    ", self.version).as_bytes());
        for offset in [
            text_start,
            text_stop,
            header_data_start,
            header_data_end,
            analysis_start,
            analysis_stop,
        ] {
            out.extend_from_slice(format!("{offset:>8}").as_bytes());
        }
        assert_eq!(out.len() - self.prefix.len(), 58);
        out.extend_from_slice(&text);
        out.extend_from_slice(&analysis_bytes);
        out.extend_from_slice(&self.data);
        out
    }
}

/// Little-endian 16-bit integer file with the given channel names.
pub fn int16_builder(names: &[&str], events: usize, values: &[u16]) -> FcsBuilder {
    let mut builder = FcsBuilder::new()
        .keyword("$PAR", &names.len().to_string())
        .keyword("$TOT", &events.to_string())
        .keyword("$DATATYPE", "I")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2");
    for (i, name) in names.iter().enumerate() {
        let n = i + 1;
        builder = builder
            .keyword(&format!("$P{n}B"), "16")
            .keyword(&format!("$P{n}R"), "1024")
            .keyword(&format!("$P{n}N"), name);
    }
    builder.data(values.iter().flat_map(|v| v.to_le_bytes()).collect())
}
