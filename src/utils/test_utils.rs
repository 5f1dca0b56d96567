//! Byte-exact FCS fixtures for tests

/// Offsets written into TEXT are zero-padded so the segment length does not
/// depend on their values.
const OFFSET_DIGITS: usize = 12;

#[derive(Debug, Clone)]
pub struct ParameterDef {
    name: String,
    long_name: Option<String>,
    bits: Option<u32>,
    range: u64,
    extra: Vec<(String, String)>,
}

impl ParameterDef {
    pub fn new(name: &str, bits: u32, range: u64) -> Self {
        Self {
            name: name.to_string(),
            long_name: None,
            bits: Some(bits),
            range,
            extra: Vec::new(),
        }
    }

    /// `$PnB = *` for delimited ASCII data.
    pub fn delimited(name: &str, range: u64) -> Self {
        Self {
            bits: None,
            ..Self::new(name, 0, range)
        }
    }

    pub fn long_name(mut self, long_name: &str) -> Self {
        self.long_name = Some(long_name.to_string());
        self
    }

    /// Extra `$Pn<suffix>` keyword, e.g. `("E", "4,0")`.
    pub fn keyword(mut self, suffix: &str, value: &str) -> Self {
        self.extra.push((suffix.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct FcsBuilder {
    version: String,
    data_type: String,
    byte_order: String,
    mode: String,
    parameters: Vec<ParameterDef>,
    keywords: Vec<(String, String)>,
    omitted: Vec<String>,
    supplemental: Vec<(String, String)>,
    analysis: Vec<(String, String)>,
    data: Vec<u8>,
    events: Option<usize>,
    recorded_events: usize,
    zero_header_data: bool,
    keyword_data_shift: u64,
    data_end_overrun: bool,
    next_data: u64,
}

impl FcsBuilder {
    pub fn new(data_type: &str) -> Self {
        Self {
            version: "FCS3.1".into(),
            data_type: data_type.into(),
            byte_order: "1,2,3,4".into(),
            mode: "L".into(),
            parameters: Vec::new(),
            keywords: Vec::new(),
            omitted: Vec::new(),
            supplemental: Vec::new(),
            analysis: Vec::new(),
            data: Vec::new(),
            events: None,
            recorded_events: 0,
            zero_header_data: false,
            keyword_data_shift: 0,
            data_end_overrun: false,
            next_data: 0,
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.into();
        self
    }

    pub fn byte_order(mut self, byte_order: &str) -> Self {
        self.byte_order = byte_order.into();
        self
    }

    pub fn mode(mut self, mode: &str) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn parameter(mut self, parameter: ParameterDef) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Extra TEXT keyword. Written last, so it overrides generated keywords.
    pub fn keyword(mut self, key: &str, value: &str) -> Self {
        self.keywords.push((key.into(), value.into()));
        self
    }

    pub fn omit_keyword(mut self, key: &str) -> Self {
        self.omitted.push(key.into());
        self
    }

    pub fn supplemental_keyword(mut self, key: &str, value: &str) -> Self {
        self.supplemental.push((key.into(), value.into()));
        self
    }

    pub fn analysis_keyword(mut self, key: &str, value: &str) -> Self {
        self.analysis.push((key.into(), value.into()));
        self
    }

    /// Overrides the `$TOT` value derived from the recorded events.
    pub fn events(mut self, events: usize) -> Self {
        self.events = Some(events);
        self
    }

    pub fn raw_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn event_u16(mut self, values: &[u16], big_endian: bool) -> Self {
        for v in values {
            let bytes = if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
            self.data.extend_from_slice(&bytes);
        }
        self.recorded_events += 1;
        self
    }

    pub fn event_f32(mut self, values: &[f32], big_endian: bool) -> Self {
        for v in values {
            let bytes = if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
            self.data.extend_from_slice(&bytes);
        }
        self.recorded_events += 1;
        self
    }

    pub fn event_f64(mut self, values: &[f64]) -> Self {
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        self.recorded_events += 1;
        self
    }

    /// Writes 0 for the DATA offsets in the HEADER, as done for large files.
    pub fn zero_header_data_offsets(mut self) -> Self {
        self.zero_header_data = true;
        self
    }

    /// Makes `$BEGINDATA`/`$ENDDATA` disagree with the HEADER by `shift` bytes.
    pub fn keyword_data_shift(mut self, shift: u64) -> Self {
        self.keyword_data_shift = shift;
        self
    }

    /// Points the DATA end offset, in HEADER and TEXT, one byte past the data.
    pub fn data_end_past_file(mut self) -> Self {
        self.data_end_overrun = true;
        self
    }

    pub fn next_data(mut self, relative: u64) -> Self {
        self.next_data = relative;
        self
    }

    /// Concatenates datasets into one file with a `$NEXTDATA` chain.
    pub fn chain(datasets: Vec<FcsBuilder>) -> Vec<u8> {
        let count = datasets.len();
        let mut file = Vec::new();
        for (i, dataset) in datasets.into_iter().enumerate() {
            let len = dataset.clone().build().len() as u64;
            let next = if i + 1 < count { len } else { 0 };
            file.extend(dataset.next_data(next).build());
        }
        file
    }

    pub fn build(self) -> Vec<u8> {
        const HEADER_LEN: u64 = 58;

        let padded = |n: u64| format!("{:0width$}", n, width = OFFSET_DIGITS);
        let supplemental = if self.supplemental.is_empty() {
            Vec::new()
        } else {
            render_text(&self.supplemental)
        };
        let analysis = if self.analysis.is_empty() {
            Vec::new()
        } else {
            render_text(&self.analysis)
        };

        // Placeholder pass fixes the TEXT length
        let text_len = render_text(&self.text_keywords(&padded, [0; 6])).len() as u64;
        let text = (HEADER_LEN, HEADER_LEN + text_len - 1);
        let stext_start = text.1 + 1;
        let stext = segment(stext_start, supplemental.len());
        let data_start = stext_start + supplemental.len() as u64;
        let mut data = segment(data_start, self.data.len());
        if self.data_end_overrun {
            data.1 += 1;
        }
        let analysis_start = data_start + self.data.len() as u64;
        let analysis_range = segment(analysis_start, analysis.len());

        let offsets = [
            analysis_range.0,
            analysis_range.1,
            stext.0,
            stext.1,
            data.0 + self.keyword_data_shift,
            data.1 + self.keyword_data_shift,
        ];
        let text_bytes = render_text(&self.text_keywords(&padded, offsets));
        assert_eq!(text_bytes.len() as u64, text_len);

        let header_data = if self.zero_header_data { (0, 0) } else { data };
        let mut file = format!("{:<6}    ", self.version).into_bytes();
        for value in [text.0, text.1, header_data.0, header_data.1, analysis_range.0, analysis_range.1] {
            file.extend_from_slice(format!("{:>8}", value).as_bytes());
        }
        file.extend(text_bytes);
        file.extend(supplemental);
        file.extend(&self.data);
        file.extend(analysis);
        file
    }

    fn text_keywords(&self, padded: &dyn Fn(u64) -> String, offsets: [u64; 6]) -> Vec<(String, String)> {
        let mut keywords: Vec<(String, String)> = vec![
            ("$BEGINANALYSIS".into(), padded(offsets[0])),
            ("$ENDANALYSIS".into(), padded(offsets[1])),
            ("$BEGINSTEXT".into(), padded(offsets[2])),
            ("$ENDSTEXT".into(), padded(offsets[3])),
            ("$BEGINDATA".into(), padded(offsets[4])),
            ("$ENDDATA".into(), padded(offsets[5])),
            ("$BYTEORD".into(), self.byte_order.clone()),
            ("$DATATYPE".into(), self.data_type.clone()),
            ("$MODE".into(), self.mode.clone()),
            ("$NEXTDATA".into(), padded(self.next_data)),
            ("$PAR".into(), self.parameters.len().to_string()),
            (
                "$TOT".into(),
                self.events.unwrap_or(self.recorded_events).to_string(),
            ),
        ];
        for (i, p) in self.parameters.iter().enumerate() {
            let n = i + 1;
            let bits = p.bits.map_or("*".to_string(), |b| b.to_string());
            keywords.push((format!("$P{}N", n), p.name.clone()));
            keywords.push((format!("$P{}B", n), bits));
            keywords.push((format!("$P{}R", n), p.range.to_string()));
            keywords.push((format!("$P{}E", n), "0,0".into()));
            if let Some(long_name) = &p.long_name {
                keywords.push((format!("$P{}S", n), long_name.clone()));
            }
            for (suffix, value) in &p.extra {
                keywords.push((format!("$P{}{}", n, suffix), value.clone()));
            }
        }
        keywords.extend(self.keywords.iter().cloned());
        keywords.retain(|(k, _)| !self.omitted.iter().any(|o| o == k));
        keywords
    }
}

/// Inclusive range of a segment of `len` bytes starting at `start`, `(0, 0)` when empty.
fn segment(start: u64, len: usize) -> (u64, u64) {
    if len == 0 {
        (0, 0)
    } else {
        (start, start + len as u64 - 1)
    }
}

fn render_text(keywords: &[(String, String)]) -> Vec<u8> {
    let escape = |s: &str| s.replace('/', "//");
    let mut text = String::from("/");
    for (key, value) in keywords {
        text.push_str(&escape(key));
        text.push('/');
        text.push_str(&escape(value));
        text.push('/');
    }
    text.into_bytes()
}
